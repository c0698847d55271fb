//! Recipe health analysis: fetch a recipe page or take pasted text, extract
//! the ingredient list, score every ingredient and the recipe as a whole,
//! and suggest healthier swaps.
//!
//! # Example
//! ```no_run
//! use silverfood::{AnalyseOptions, Analyzer, AppConfig, RecipeSource};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::builder().config(AppConfig::load()?).build()?;
//! let analysis = analyzer
//!     .analyse(
//!         RecipeSource::Text("- 2 uien\n- 300g gehakt\n- 1 blik tomaten".to_string()),
//!         AnalyseOptions::default(),
//!     )
//!     .await?;
//! println!("{}: {}/10", analysis.recipe_title, analysis.health_score);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod api;
pub mod builder;
pub mod config;
pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod model;
pub mod nutrition;
pub mod parser;
pub mod pipelines;

pub use aggregate::{AnalyseOptions, RecipeAggregator};
pub use api::{create_router, AppState};
pub use builder::AnalyzerBuilder;
pub use config::AppConfig;
pub use error::{AnalysisError, ExtractionError, FetchError, NutritionError};
pub use model::{
    HealthClass, NutritionFacts, ParsedIngredient, RecipeAnalysis, RecipeSource, ScoredIngredient,
    Swap,
};
pub use parser::{parse, parse_line};
pub use pipelines::Analyzer;
