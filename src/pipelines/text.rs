use super::{enter, Analyzer, Stage};
use crate::aggregate::AnalyseOptions;
use crate::error::AnalysisError;
use crate::extractors::extract_text;
use crate::model::RecipeAnalysis;

/// Pasted text must carry at least `min_len` characters
pub fn validate(text: &str, min_len: usize) -> Result<(), AnalysisError> {
    if text.trim().chars().count() < min_len {
        return Err(AnalysisError::Validation(format!(
            "Text must be at least {min_len} characters"
        )));
    }
    Ok(())
}

pub async fn process(
    analyzer: &Analyzer,
    text: &str,
    options: AnalyseOptions,
) -> Result<RecipeAnalysis, AnalysisError> {
    enter(Stage::Extracting, "pasted text");
    let extracted = extract_text(text, analyzer.config().max_ingredients)?;
    Ok(analyzer.score(extracted, options).await)
}
