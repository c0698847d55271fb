//! Health score and nutrition facts per ingredient.
//!
//! Resolution is tiered: the shared cache, then the built-in score table,
//! then the external nutrition database, then a fixed default. Lookups never
//! fail; upstream trouble degrades to the default score.

mod cache;
mod openfoodfacts;
pub mod scoring;
pub mod table;

pub use cache::NutritionCache;
pub use openfoodfacts::OpenFoodFactsClient;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{NutritionConfig, ScoringWeights};
use crate::error::NutritionError;
use crate::model::NutritionFacts;

/// External nutrition database
#[async_trait]
pub trait NutritionSource: Send + Sync {
    /// Facts per 100 g for the best match, `Ok(None)` when nothing matched
    async fn lookup(&self, query: &str) -> Result<Option<NutritionFacts>, NutritionError>;
}

/// Which tier decided the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Table,
    Nutrition,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub facts: Option<NutritionFacts>,
    pub health_score: u8,
    pub source: ScoreSource,
}

/// Second query tried when the full name finds nothing: the known
/// ingredient inside the name, else its last word without a plural ending.
pub fn fallback_query(name: &str) -> Option<String> {
    let candidate = match table::lookup(name) {
        Some((key, _)) => key.to_string(),
        None => {
            let last = name.split_whitespace().last()?;
            let chars = last.chars().count();
            if chars > 5 && last.ends_with("en") {
                last[..last.len() - 2].to_string()
            } else if chars > 4 && last.ends_with('s') {
                last[..last.len() - 1].to_string()
            } else {
                last.to_string()
            }
        }
    };
    (candidate != name).then_some(candidate)
}

pub struct NutritionResolver {
    source: Option<Arc<dyn NutritionSource>>,
    cache: NutritionCache,
    weights: ScoringWeights,
    default_score: u8,
    timeout: Duration,
    concurrency: usize,
}

impl NutritionResolver {
    pub fn new(
        source: Option<Arc<dyn NutritionSource>>,
        cache: NutritionCache,
        config: &NutritionConfig,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            source,
            cache,
            weights,
            default_score: config.default_unknown_score.min(10),
            timeout: config.timeout(),
            concurrency: config.lookup_concurrency.max(1),
        }
    }

    pub fn cache(&self) -> &NutritionCache {
        &self.cache
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    fn default_resolution(&self) -> Resolution {
        Resolution {
            facts: None,
            health_score: self.default_score,
            source: ScoreSource::Default,
        }
    }

    /// Facts from the external source; the flag says whether the answer is
    /// definitive and may be cached
    async fn fetch_facts(&self, name: &str) -> (Option<NutritionFacts>, bool) {
        let Some(source) = &self.source else {
            return (None, true);
        };

        let queries = std::iter::once(name.to_string()).chain(fallback_query(name));
        for query in queries {
            match tokio::time::timeout(self.timeout, source.lookup(&query)).await {
                Ok(Ok(Some(facts))) => return (Some(facts), true),
                Ok(Ok(None)) => debug!("No nutrition match for '{query}'"),
                Ok(Err(e)) => {
                    warn!("Nutrition lookup for '{query}' failed: {e}");
                    return (None, false);
                }
                Err(_) => {
                    warn!("Nutrition lookup for '{query}' timed out");
                    return (None, false);
                }
            }
        }
        (None, true)
    }

    /// Score and facts for one canonical ingredient name
    pub async fn resolve(&self, name: &str) -> Resolution {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return self.default_resolution();
        }
        if let Some(hit) = self.cache.get(&key) {
            debug!("Cache hit for '{key}'");
            return hit;
        }

        let (facts, definitive) = self.fetch_facts(&key).await;
        let resolution = match (table::lookup(&key), facts) {
            (Some((_, score)), facts) => Resolution {
                facts,
                health_score: score,
                source: ScoreSource::Table,
            },
            (None, Some(facts)) => Resolution {
                health_score: scoring::score_facts(&facts, &self.weights),
                facts: Some(facts),
                source: ScoreSource::Nutrition,
            },
            (None, None) => self.default_resolution(),
        };

        if definitive {
            self.cache.put(key, resolution.clone());
        }
        resolution
    }

    /// Resolve several names with bounded concurrency, keeping input order
    pub async fn resolve_all(&self, names: &[String]) -> Vec<Resolution> {
        // collected first: a lazily mapped stream over borrowed names is not
        // Send for every lifetime, and axum handlers need that
        let lookups: Vec<_> = names.iter().map(|name| self.resolve(name)).collect();
        stream::iter(lookups)
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers from a fixed list and counts calls
    struct StubSource {
        known: Vec<(&'static str, NutritionFacts)>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(known: Vec<(&'static str, NutritionFacts)>) -> Self {
            Self {
                known,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NutritionSource for StubSource {
        async fn lookup(&self, query: &str) -> Result<Option<NutritionFacts>, NutritionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NutritionError::Timeout);
            }
            Ok(self
                .known
                .iter()
                .find(|(name, _)| *name == query)
                .map(|(_, facts)| facts.clone()))
        }
    }

    fn resolver(source: Arc<StubSource>) -> NutritionResolver {
        NutritionResolver::new(
            Some(source),
            NutritionCache::new(16, None),
            &NutritionConfig::default(),
            ScoringWeights::default(),
        )
    }

    fn sugary() -> NutritionFacts {
        NutritionFacts {
            calories: 400.0,
            sugar_g: 60.0,
            nova_group: Some(4),
            ..NutritionFacts::default()
        }
    }

    #[tokio::test]
    async fn test_table_score_wins_and_keeps_facts() {
        let source = Arc::new(StubSource::new(vec![("suiker", sugary())]));
        let resolution = resolver(source).resolve("suiker").await;
        assert_eq!(resolution.health_score, 1);
        assert_eq!(resolution.source, ScoreSource::Table);
        assert!(resolution.facts.is_some());
    }

    #[tokio::test]
    async fn test_facts_score_for_unknown_name() {
        let source = Arc::new(StubSource::new(vec![("stroopwafel", sugary())]));
        let resolution = resolver(source).resolve("stroopwafel").await;
        assert_eq!(resolution.source, ScoreSource::Nutrition);
        // 10 - 0.75 - 3 - 2.25
        assert_eq!(resolution.health_score, 4);
    }

    #[tokio::test]
    async fn test_fallback_query_is_tried() {
        let source = Arc::new(StubSource::new(vec![("stroopwafel", sugary())]));
        let resolution = resolver(source.clone()).resolve("mini stroopwafels").await;
        assert_eq!(resolution.source, ScoreSource::Nutrition);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unresolvable_gets_default_and_is_cached() {
        let source = Arc::new(StubSource::new(vec![]));
        let resolver = resolver(source.clone());

        let first = resolver.resolve("xanthaangom").await;
        let second = resolver.resolve("Xanthaangom").await;

        assert_eq!(first.health_score, 5);
        assert_eq!(first.facts, None);
        assert_eq!(first, second);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_absorbed_but_not_cached() {
        let source = Arc::new(StubSource {
            fail: true,
            ..StubSource::new(vec![])
        });
        let resolver = resolver(source.clone());

        let resolution = resolver.resolve("kip").await;
        assert_eq!(resolution.health_score, 6);
        assert_eq!(resolution.facts, None);
        assert!(resolver.cache().is_empty());

        resolver.resolve("kip").await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_without_source_uses_table_only() {
        let resolver = NutritionResolver::new(
            None,
            NutritionCache::new(16, None),
            &NutritionConfig::default(),
            ScoringWeights::default(),
        );
        assert_eq!(resolver.resolve("broccoli").await.health_score, 9);
        assert_eq!(resolver.resolve("onbekend").await.health_score, 5);
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order() {
        let source = Arc::new(StubSource::new(vec![]));
        let names = vec!["suiker".to_string(), "broccoli".to_string(), "zout".to_string()];
        let scores: Vec<u8> = resolver(source)
            .resolve_all(&names)
            .await
            .into_iter()
            .map(|r| r.health_score)
            .collect();
        assert_eq!(scores, vec![1, 9, 2]);
    }

    #[test]
    fn test_fallback_query() {
        assert_eq!(fallback_query("extra vierge olijfolie").as_deref(), Some("olijfolie"));
        assert_eq!(fallback_query("mini stroopwafels").as_deref(), Some("stroopwafel"));
        assert_eq!(fallback_query("suiker"), None);
    }
}
