#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("{kind} pattern list is empty")]
    EmptyPatterns { kind: &'static str },
    #[error("invalid {kind} pattern: {source}")]
    Pattern {
        kind: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("invalid lexicon JSON: {0}")]
    Lexicon(#[from] serde_json::Error),
}
