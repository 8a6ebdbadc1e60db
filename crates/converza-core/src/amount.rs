use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// One Unicode decimal digit (general category `Nd`).
static DECIMAL_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d$").unwrap());

/// Non-negative monetary amount with two fractional digits, held as cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid digit in amount: {0:?}")]
    InvalidDigit(char),
    #[error("more than two fractional digits")]
    Precision,
    #[error("amount out of range")]
    Overflow,
}

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u128::MAX);

    pub const fn from_cents(cents: u128) -> Self {
        Amount(cents)
    }

    pub const fn cents(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Lossy conversion for reporting and SQL aggregates.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Value of a decimal digit in any script.
///
/// Every script's digits form contiguous runs of ten starting at its zero,
/// so the offset from the start of the run is the value.
fn digit_value(c: char) -> Option<u32> {
    if c.is_ascii_digit() {
        return c.to_digit(10);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut start = c as u32;
    while let Some(prev) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

fn push_digit(acc: u128, c: char) -> Result<u128, AmountParseError> {
    let d = digit_value(c).ok_or(AmountParseError::InvalidDigit(c))?;
    acc.checked_mul(10)
        .and_then(|v| v.checked_add(u128::from(d)))
        .ok_or(AmountParseError::Overflow)
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parse `1234`, `1,234.56` or `12.5`. Thousands separators are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if frac.chars().count() > 2 {
            return Err(AmountParseError::Precision);
        }

        let mut units: u128 = 0;
        let mut saw_digit = false;
        for c in whole.chars().filter(|&c| c != ',') {
            units = push_digit(units, c)?;
            saw_digit = true;
        }
        let mut cents: u128 = 0;
        for c in frac.chars() {
            cents = push_digit(cents, c)?;
            saw_digit = true;
        }
        if !saw_digit {
            return Err(AmountParseError::Empty);
        }
        if frac.chars().count() == 1 {
            cents *= 10;
        }

        units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .map(Amount)
            .ok_or(AmountParseError::Overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_and_grouped() {
        assert_eq!("50".parse::<Amount>().unwrap(), Amount::from_cents(5000));
        assert_eq!(
            "1,234.56".parse::<Amount>().unwrap(),
            Amount::from_cents(123_456)
        );
        assert_eq!("12.5".parse::<Amount>().unwrap(), Amount::from_cents(1250));
    }

    #[test]
    fn parse_digits_from_other_scripts() {
        // Arabic-Indic five and zero
        assert_eq!(
            "\u{0665}\u{0660}".parse::<Amount>().unwrap(),
            Amount::from_cents(5000)
        );
        // Devanagari 1,234.56
        assert_eq!(
            "\u{0967},\u{0968}\u{0969}\u{096A}.\u{096B}\u{096C}"
                .parse::<Amount>()
                .unwrap(),
            Amount::from_cents(123_456)
        );
        // Fullwidth 9 and mathematical bold 7
        assert_eq!(digit_value('\u{FF19}'), Some(9));
        assert_eq!(digit_value('\u{1D7D5}'), Some(7));
        assert_eq!(digit_value('x'), None);
        assert_eq!(
            "1x".parse::<Amount>(),
            Err(AmountParseError::InvalidDigit('x'))
        );
    }

    #[test]
    fn parse_large_amounts_exactly() {
        let nines = "9".repeat(30);
        let amount = nines.parse::<Amount>().unwrap();
        assert_eq!(amount.to_string(), format!("{nines}.00"));
    }

    #[test]
    fn parse_rejects_overflow() {
        let huge = "9".repeat(40);
        assert_eq!(huge.parse::<Amount>(), Err(AmountParseError::Overflow));
    }

    #[test]
    fn parse_rejects_empty_and_precision() {
        assert_eq!("".parse::<Amount>(), Err(AmountParseError::Empty));
        assert_eq!(",".parse::<Amount>(), Err(AmountParseError::Empty));
        assert_eq!("1.234".parse::<Amount>(), Err(AmountParseError::Precision));
    }

    #[test]
    fn display_always_two_decimals() {
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::from_cents(12_000).to_string(), "120.00");
    }

    #[test]
    fn serializes_as_decimal_string() {
        let json = serde_json::to_string(&Amount::from_cents(4500)).unwrap();
        assert_eq!(json, r#""45.00""#);
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Amount::from_cents(4500));
    }
}
