use std::sync::Arc;

use crate::aggregate::RecipeAggregator;
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::extractors::{HtmlExtractor, PatternMemory};
use crate::fetchers::{Fetcher, LayeredFetcher, Renderer};
use crate::nutrition::{NutritionCache, NutritionResolver, NutritionSource, OpenFoodFactsClient};
use crate::pipelines::Analyzer;

/// Builder for wiring an [`Analyzer`] from configuration and optional
/// replacement parts
#[derive(Default)]
pub struct AnalyzerBuilder {
    config: AppConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    renderer: Option<Arc<dyn Renderer>>,
    nutrition_source: Option<Arc<dyn NutritionSource>>,
    cache: Option<NutritionCache>,
    patterns: Option<Arc<PatternMemory>>,
}

impl AnalyzerBuilder {
    /// Use this configuration instead of the defaults
    ///
    /// # Example
    /// ```
    /// use silverfood::{Analyzer, AppConfig};
    ///
    /// let builder = Analyzer::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the layered page fetcher entirely
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Headless renderer for the layered fetcher, instead of the one
    /// configured through `renderer_url`
    ///
    /// Ignored when a custom fetcher is set.
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Replace the Open Food Facts client
    pub fn nutrition_source(mut self, source: Arc<dyn NutritionSource>) -> Self {
        self.nutrition_source = Some(source);
        self
    }

    /// Share an existing nutrition cache
    pub fn cache(mut self, cache: NutritionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Share an existing learned-pattern memory
    pub fn patterns(mut self, patterns: Arc<PatternMemory>) -> Self {
        self.patterns = Some(patterns);
        self
    }

    /// Assemble the analyzer
    ///
    /// # Errors
    /// Returns `AnalysisError` if an HTTP client cannot be created.
    ///
    /// # Example
    /// ```
    /// use silverfood::{Analyzer, AppConfig};
    ///
    /// let mut config = AppConfig::default();
    /// config.nutrition.enabled = false;
    /// let analyzer = Analyzer::builder().config(config).build().unwrap();
    /// assert!(!analyzer.resolver().has_source());
    /// ```
    pub fn build(self) -> Result<Analyzer, AnalysisError> {
        let config = self.config;

        let fetcher: Arc<dyn Fetcher> = match (self.fetcher, self.renderer) {
            (Some(fetcher), _) => fetcher,
            (None, Some(renderer)) => Arc::new(LayeredFetcher::new(&config.fetcher, Some(renderer))?),
            (None, None) => Arc::new(LayeredFetcher::from_config(&config.fetcher)?),
        };

        let source = match self.nutrition_source {
            Some(source) => Some(source),
            None if config.nutrition.enabled => {
                let client =
                    OpenFoodFactsClient::new(&config.nutrition.base_url, config.nutrition.timeout())
                        .map_err(|e| AnalysisError::Internal(e.to_string()))?;
                Some(Arc::new(client) as Arc<dyn NutritionSource>)
            }
            None => None,
        };

        let cache = self.cache.unwrap_or_else(|| {
            NutritionCache::new(config.nutrition.cache_capacity, config.nutrition.cache_ttl())
        });
        let resolver = NutritionResolver::new(
            source,
            cache,
            &config.nutrition,
            config.scoring.weights.clone(),
        );

        let patterns = self.patterns.unwrap_or_default();
        let extractor = HtmlExtractor::new(patterns, config.analysis.max_ingredients);

        Ok(Analyzer::new(
            fetcher,
            extractor,
            resolver,
            RecipeAggregator::from_config(&config),
            config.analysis.clone(),
        ))
    }
}
