use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::aggregate::goals::GoalWeights;

/// Main service configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub fetcher: FetcherConfig,
    pub nutrition: NutritionConfig,
    pub scoring: ScoringConfig,
    pub analysis: AnalysisConfig,
    pub rate_limit: RateLimitConfig,
    /// Overrides and additions to the built-in health goal table
    pub goals: HashMap<String, GoalWeights>,
    /// Only reported through /health so the front-end can gate AI features
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Configuration for the layered page fetcher
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FetcherConfig {
    /// Timeout of a single direct HTTP request in seconds
    pub request_timeout_secs: u64,
    /// Attempts of the direct strategy before escalating to the renderer
    pub request_attempts: u32,
    /// Base delay between retries in milliseconds (grows linearly per attempt)
    pub retry_delay_ms: u64,
    /// Lower bound of the randomized delay before each direct request
    pub min_delay_ms: u64,
    /// Upper bound of the randomized delay before each direct request
    pub max_delay_ms: u64,
    /// Bodies shorter than this are treated as failed fetches
    pub min_body_bytes: usize,
    /// Base URL of the page rendering service; falls back to PAGE_SCRIBER_URL
    pub renderer_url: Option<String>,
    pub render_timeout_secs: u64,
    /// Time the renderer waits for dynamic content after load
    pub render_wait_ms: u64,
    pub render_attempts: u32,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            request_attempts: 2,
            retry_delay_ms: 1000,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            min_body_bytes: 100,
            renderer_url: None,
            render_timeout_secs: 30,
            render_wait_ms: 3000,
            render_attempts: 1,
        }
    }
}

impl FetcherConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    /// Configured renderer URL, or the PAGE_SCRIBER_URL environment variable
    pub fn renderer_url(&self) -> Option<String> {
        self.renderer_url
            .clone()
            .or_else(|| std::env::var("PAGE_SCRIBER_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }
}

/// Configuration for the nutrition resolver and its cache
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NutritionConfig {
    /// Disable to score from the built-in table only
    pub enabled: bool,
    pub base_url: String,
    pub timeout_secs: u64,
    pub cache_capacity: usize,
    pub cache_ttl_secs: Option<u64>,
    pub default_unknown_score: u8,
    /// Concurrent lookups per recipe
    pub lookup_concurrency: usize,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://world.openfoodfacts.org".to_string(),
            timeout_secs: 10,
            cache_capacity: 1024,
            cache_ttl_secs: None,
            default_unknown_score: 5,
            lookup_concurrency: 4,
        }
    }
}

impl NutritionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    /// Ingredients scoring below this get a swap suggestion
    pub swap_threshold: u8,
    pub default_portions: u32,
    pub weights: ScoringWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            swap_threshold: 6,
            default_portions: 4,
            weights: ScoringWeights::default(),
        }
    }
}

/// Coefficients of the per-100g ingredient score.
///
/// Each penalty applies to the amount above its threshold and is capped.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringWeights {
    pub calories_threshold: f64,
    pub calories_per_kcal: f64,
    pub calories_max: f64,
    pub saturated_fat_threshold: f64,
    pub saturated_fat_per_g: f64,
    pub saturated_fat_max: f64,
    pub sugar_threshold: f64,
    pub sugar_per_g: f64,
    pub sugar_max: f64,
    pub sodium_threshold_mg: f64,
    pub sodium_per_mg: f64,
    pub sodium_max: f64,
    pub nova_per_group: f64,
    pub fiber_per_g: f64,
    pub fiber_max: f64,
    pub protein_per_g: f64,
    pub protein_max: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            calories_threshold: 250.0,
            calories_per_kcal: 0.005,
            calories_max: 1.5,
            saturated_fat_threshold: 2.0,
            saturated_fat_per_g: 0.3,
            saturated_fat_max: 3.0,
            sugar_threshold: 5.0,
            sugar_per_g: 0.15,
            sugar_max: 3.0,
            sodium_threshold_mg: 120.0,
            sodium_per_mg: 0.004,
            sodium_max: 2.5,
            nova_per_group: 0.75,
            fiber_per_g: 0.3,
            fiber_max: 1.5,
            protein_per_g: 0.1,
            protein_max: 1.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ceiling of simultaneously running analyses
    pub max_concurrent: usize,
    /// Budget for a whole request, including the wait for a slot
    pub request_timeout_secs: u64,
    pub max_ingredients: usize,
    pub min_text_len: usize,
    pub max_url_len: usize,
    /// Accept localhost and private network URLs, for local development
    pub allow_private_hosts: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            request_timeout_secs: 90,
            max_ingredients: 30,
            min_text_len: 20,
            max_url_len: 500,
            allow_private_hosts: false,
        }
    }
}

impl AnalysisConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub window_secs: u64,
    /// Key clients on the first `X-Forwarded-For` hop; only safe behind a
    /// reverse proxy that overwrites the header
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 8,
            window_secs: 60,
            trust_proxy: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with SILVERFOOD__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: SILVERFOOD__RATE_LIMIT__REQUESTS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Whether AI explanation features can be offered to the front-end
    pub fn openai_available(&self) -> bool {
        self.openai_api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Load configuration from `config.toml` and `SILVERFOOD__*` environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: SILVERFOOD__NUTRITION__TIMEOUT_SECS
        .add_source(
            Environment::with_prefix("SILVERFOOD")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
