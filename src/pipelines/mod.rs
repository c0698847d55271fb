pub mod text;
pub mod url;

use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::aggregate::{AnalyseOptions, RecipeAggregator};
use crate::builder::AnalyzerBuilder;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::extractors::{HtmlExtractor, PatternMemory};
use crate::fetchers::Fetcher;
use crate::model::{ExtractedRecipe, RecipeAnalysis, RecipeSource};
use crate::nutrition::NutritionResolver;
use crate::parser;

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Fetching,
    Extracting,
    Parsing,
    Scoring,
    Aggregating,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Fetching => "fetching",
            Stage::Extracting => "extracting",
            Stage::Parsing => "parsing",
            Stage::Scoring => "scoring",
            Stage::Aggregating => "aggregating",
            Stage::Responded => "responded",
        };
        f.write_str(name)
    }
}

pub(crate) fn enter(stage: Stage, subject: &str) {
    debug!("[{stage}] {subject}");
}

/// Runs recipe sources through fetch, extraction, parsing, scoring and
/// aggregation. Shared by all request handlers.
pub struct Analyzer {
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) extractor: HtmlExtractor,
    pub(crate) resolver: NutritionResolver,
    pub(crate) aggregator: RecipeAggregator,
    permits: Semaphore,
    config: AnalysisConfig,
}

impl Analyzer {
    pub(crate) fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: HtmlExtractor,
        resolver: NutritionResolver,
        aggregator: RecipeAggregator,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            resolver,
            aggregator,
            permits: Semaphore::new(config.max_concurrent.max(1)),
            config,
        }
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternMemory {
        self.extractor.patterns()
    }

    pub fn resolver(&self) -> &NutritionResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &RecipeAggregator {
        &self.aggregator
    }

    /// Reject malformed input before any pipeline work
    pub fn validate(&self, source: &RecipeSource) -> Result<(), AnalysisError> {
        match source {
            RecipeSource::Url(u) => {
                url::validate(u, self.config.max_url_len, self.config.allow_private_hosts)
            }
            RecipeSource::Text(t) => text::validate(t, self.config.min_text_len),
        }
    }

    /// Analyse one recipe source.
    ///
    /// The request budget covers the wait for a free slot; when it runs out
    /// the pipeline future is dropped, aborting in-flight HTTP calls.
    pub async fn analyse(
        &self,
        source: RecipeSource,
        options: AnalyseOptions,
    ) -> Result<RecipeAnalysis, AnalysisError> {
        self.validate(&source)?;
        let source = match source {
            RecipeSource::Url(u) => RecipeSource::Url(u.trim().to_string()),
            text => text,
        };
        let subject = match &source {
            RecipeSource::Url(u) => u.clone(),
            RecipeSource::Text(t) => format!("text ({} chars)", t.chars().count()),
        };
        enter(Stage::Received, &subject);

        let run = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|e| AnalysisError::Internal(e.to_string()))?;
            match &source {
                RecipeSource::Url(u) => url::process(self, u, options).await,
                RecipeSource::Text(t) => text::process(self, t, options).await,
            }
        };

        let analysis = tokio::time::timeout(self.config.request_timeout(), run)
            .await
            .unwrap_or(Err(AnalysisError::Timeout))
            .inspect_err(|e| warn!("Analysis of {subject} failed ({}): {e}", e.reason()))?;

        enter(Stage::Responded, &subject);
        info!(
            "Analysed {subject}: '{}' scored {} over {} ingredients",
            analysis.recipe_title,
            analysis.health_score,
            analysis.all_ingredients.len()
        );
        Ok(analysis)
    }

    /// Parse, resolve and aggregate extracted lines
    pub(crate) async fn score(
        &self,
        extracted: ExtractedRecipe,
        options: AnalyseOptions,
    ) -> RecipeAnalysis {
        enter(Stage::Parsing, &extracted.title);
        let parsed: Vec<_> = extracted
            .lines
            .iter()
            .filter_map(|line| parser::parse_line(&line.text))
            .collect();

        enter(Stage::Scoring, &extracted.title);
        let names: Vec<String> = parsed.iter().map(|i| i.name.clone()).collect();
        let resolutions = self.resolver.resolve_all(&names).await;

        enter(Stage::Aggregating, &extracted.title);
        let scored = parsed
            .into_iter()
            .zip(resolutions)
            .map(|(ingredient, resolution)| self.aggregator.annotate(ingredient, resolution))
            .collect();
        self.aggregator.aggregate(&extracted.title, scored, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::FetchError;
    use crate::fetchers::{FetchStrategy, HtmlDocument};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct SlowFetcher;

    #[async_trait]
    impl Fetcher for SlowFetcher {
        async fn fetch(&self, _url: &str) -> Result<HtmlDocument, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(FetchError::Timeout("never".into()))
        }
    }

    /// Remembers the URLs it was asked for
    #[derive(Default)]
    struct RecordingFetcher {
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Fetcher for RecordingFetcher {
        async fn fetch(&self, url: &str) -> Result<HtmlDocument, FetchError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(HtmlDocument {
                url: url.to_string(),
                html: r#"<html><head><script type="application/ld+json">
                    {"@type": "Recipe", "name": "Soep", "recipeIngredient": ["1 ui", "500 ml bouillon"]}
                    </script></head><body></body></html>"#
                    .to_string(),
                strategy: FetchStrategy::Direct,
            })
        }
    }

    fn analyzer(timeout_secs: u64) -> Analyzer {
        let mut config = AppConfig::default();
        config.nutrition.enabled = false;
        config.analysis.request_timeout_secs = timeout_secs;
        config.analysis.max_concurrent = 1;
        Analyzer::builder()
            .config(config)
            .fetcher(Arc::new(SlowFetcher))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_budget_aborts_slow_fetch() {
        let analyzer = analyzer(5);
        let result = analyzer
            .analyse(
                RecipeSource::Url("https://example.com/recept".into()),
                AnalyseOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(AnalysisError::Timeout)));
    }

    #[tokio::test]
    async fn test_validation_runs_first() {
        let analyzer = analyzer(5);
        let result = analyzer
            .analyse(RecipeSource::Text("te kort".into()), AnalyseOptions::default())
            .await;
        assert!(matches!(result, Err(AnalysisError::Validation(_))));
    }

    #[tokio::test]
    async fn test_url_is_trimmed_before_fetch() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let mut config = AppConfig::default();
        config.nutrition.enabled = false;
        let analyzer = Analyzer::builder()
            .config(config)
            .fetcher(fetcher.clone())
            .build()
            .unwrap();

        let analysis = analyzer
            .analyse(
                RecipeSource::Url("  https://example.com/recept \n".into()),
                AnalyseOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(analysis.recipe_title, "Soep");
        assert_eq!(*fetcher.urls.lock().unwrap(), vec!["https://example.com/recept"]);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Fetching.to_string(), "fetching");
        assert_eq!(Stage::Responded.to_string(), "responded");
    }
}
