use thiserror::Error;

/// Errors raised while retrieving a recipe page
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The site refused automated access (403, bot challenge, known blocker)
    #[error("Site blocks automated access: {0}")]
    Blocked(String),

    /// The page did not load within the configured time
    #[error("Timed out fetching page: {0}")]
    Timeout(String),

    /// The page does not exist
    #[error("Page not found: {0}")]
    NotFound(String),

    /// Any other transport or upstream failure
    #[error("Network error: {0}")]
    Network(String),
}

impl FetchError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Errors raised while turning a page or text into ingredient lines
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Could not find ingredients")]
    NoIngredientsFound,
}

/// Failures of the external nutrition database.
///
/// These never leave the resolver: a failed lookup degrades the ingredient
/// to the default score.
#[derive(Error, Debug)]
pub enum NutritionError {
    #[error("Nutrition database request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Nutrition database timed out")]
    Timeout,

    #[error("Unexpected nutrition database response: {0}")]
    Decode(String),
}

/// Request-level errors returned by the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Input failed validation before any pipeline work started
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The client exhausted its request budget for the current window
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The whole request exceeded its time budget
    #[error("Analysis timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Short machine-readable reason the clients map to localized messages.
    pub fn reason(&self) -> &'static str {
        match self {
            AnalysisError::Validation(_) => "invalid_input",
            AnalysisError::RateLimited { .. } => "rate_limited",
            AnalysisError::Fetch(FetchError::Blocked(_)) => "site_blocked",
            AnalysisError::Fetch(FetchError::Timeout(_)) => "timeout",
            AnalysisError::Fetch(FetchError::NotFound(_)) => "not_found",
            AnalysisError::Fetch(FetchError::Network(_)) => "network_error",
            AnalysisError::Extraction(ExtractionError::NoIngredientsFound) => "no_ingredients",
            AnalysisError::Timeout => "timeout",
            AnalysisError::Config(_) => "config_error",
            AnalysisError::Internal(_) => "internal_error",
        }
    }

    /// User-facing description of the failure.
    pub fn detail(&self) -> String {
        match self {
            AnalysisError::Validation(msg) => msg.clone(),
            AnalysisError::RateLimited { retry_after_secs } => format!(
                "Too many requests, try again in {retry_after_secs} seconds"
            ),
            AnalysisError::Fetch(FetchError::Blocked(_)) => {
                "This site blocks automated access".to_string()
            }
            AnalysisError::Fetch(FetchError::Timeout(_)) | AnalysisError::Timeout => {
                "The recipe site is temporarily unavailable, please retry".to_string()
            }
            AnalysisError::Fetch(FetchError::NotFound(_)) => {
                "Page not found, check the URL".to_string()
            }
            AnalysisError::Fetch(FetchError::Network(_)) => {
                "Could not reach the recipe site".to_string()
            }
            AnalysisError::Extraction(_) => "Could not find ingredients on this page".to_string(),
            AnalysisError::Config(_) | AnalysisError::Internal(_) => {
                "An unexpected error occurred while analysing this recipe".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_are_stable() {
        assert_eq!(
            AnalysisError::Validation("x".into()).reason(),
            "invalid_input"
        );
        assert_eq!(
            AnalysisError::RateLimited {
                retry_after_secs: 3
            }
            .reason(),
            "rate_limited"
        );
        assert_eq!(
            AnalysisError::from(FetchError::Blocked("403".into())).reason(),
            "site_blocked"
        );
        assert_eq!(
            AnalysisError::from(FetchError::Timeout("slow".into())).reason(),
            "timeout"
        );
        assert_eq!(
            AnalysisError::from(ExtractionError::NoIngredientsFound).reason(),
            "no_ingredients"
        );
    }

    #[test]
    fn test_detail_hides_internal_errors() {
        let err = AnalysisError::Internal("mutex poisoned at line 42".into());
        assert!(!err.detail().contains("mutex"));
    }
}
