use converza_pipeline::load_lexicon;
use converza_store::{ConverzaPaths, PipelineConfig};
use converza_transform::{estimate_call_duration, Lexicon, TranscriptAnalyzer};
use std::path::Path;

/// Use the workspace lexicon when one is configured, else the built-in one.
fn workspace_lexicon(repo_root: &Path) -> anyhow::Result<Lexicon> {
    let paths = ConverzaPaths::discover(repo_root);
    if !paths.is_initialized() {
        return Ok(Lexicon::builtin());
    }
    let config = PipelineConfig::load(&paths.config_json)?;
    let lexicon_path = config.lexicon_path.as_deref().map(|p| paths.resolve(p));
    load_lexicon(lexicon_path.as_deref())
}

/// `converza analyze <TEXT>`
pub fn execute(repo_root: &Path, text: &str, json: bool) -> anyhow::Result<()> {
    let analyzer = TranscriptAnalyzer::with_lexicon(&workspace_lexicon(repo_root)?)?;
    let conversion = analyzer.detect_conversion(text);
    let upsell = analyzer.extract_upsell(text);
    let sentiment = analyzer.analyze_sentiment(text);
    let chars = text.chars().count();

    if json {
        let out = serde_json::json!({
            "conversion": conversion,
            "upsell": upsell,
            "sentiment": sentiment,
            "transcript_length": chars,
            "call_duration_seconds": estimate_call_duration(chars),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &conversion.matched_phrase {
        Some(phrase) if conversion.is_conversion => println!(
            "Conversion: yes (confidence {:.2}, \"{phrase}\")",
            conversion.confidence
        ),
        _ => println!("Conversion: no"),
    }
    if upsell.has_upsell {
        println!(
            "Upsell:     ${} {}",
            upsell.amount,
            upsell.product_name.as_deref().unwrap_or("")
        );
    } else {
        println!("Upsell:     none");
    }
    println!(
        "Sentiment:  {} (confidence {:.2}, +{} / -{})",
        sentiment.label, sentiment.confidence, sentiment.positive_hits, sentiment.negative_hits
    );
    println!("Estimated duration: {}s", estimate_call_duration(chars));
    Ok(())
}

/// `converza lexicon`
pub fn lexicon() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&Lexicon::builtin())?);
    Ok(())
}
