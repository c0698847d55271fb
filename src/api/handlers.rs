use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::extract::{AppJson, AppQuery, ExtensionQuery};
use super::response::ApiError;
use super::AppState;
use crate::aggregate::{describe, find_substitution, AnalyseOptions, Substitution};
use crate::error::AnalysisError;
use crate::extractors::SITE_PROFILES;
use crate::model::{BadgeColor, HealthLevel, RecipeAnalysis, RecipeSource, Swap};
use crate::nutrition::table;
use crate::parser::canonical_name;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const MAX_EXTENSION_SUGGESTIONS: usize = 5;
const MAX_POPUP_SWAPS: usize = 3;

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    #[serde(default)]
    pub url: String,
    pub portions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub text: String,
    pub portions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    #[serde(default)]
    pub name: String,
    pub healthy: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct QuickCheck {
    pub health_score: u8,
    pub health_level: HealthLevel,
    pub badge_color: BadgeColor,
    pub ingredient_count: usize,
}

#[derive(Debug, Serialize)]
pub struct Suggestions {
    pub swaps: Vec<Swap>,
    pub total_possible_improvements: usize,
    pub current_score: u8,
}

async fn run(
    state: &AppState,
    source: RecipeSource,
    options: AnalyseOptions,
) -> Result<RecipeAnalysis, AnalysisError> {
    state.analyzer.analyse(source, options).await
}

fn canonical_query_name(name: &str) -> Result<String, ApiError> {
    let canonical = canonical_name(name);
    if canonical.is_empty() {
        return Err(AnalysisError::Validation("Ingredient name is required".to_string()).into());
    }
    Ok(canonical)
}

pub async fn analyse(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UrlQuery>,
) -> Result<Json<RecipeAnalysis>, ApiError> {
    let options = AnalyseOptions::default().with_portions(query.portions);
    let analysis = run(&state, RecipeSource::Url(query.url), options).await?;
    Ok(Json(analysis))
}

pub async fn analyse_text(
    State(state): State<AppState>,
    AppJson(body): AppJson<TextBody>,
) -> Result<Json<RecipeAnalysis>, ApiError> {
    let options = AnalyseOptions::default().with_portions(body.portions);
    let analysis = run(&state, RecipeSource::Text(body.text), options).await?;
    Ok(Json(analysis))
}

pub async fn chrome_analyze(
    State(state): State<AppState>,
    ExtensionQuery(query): ExtensionQuery<UrlQuery>,
) -> Result<Json<Value>, ApiError> {
    let options = AnalyseOptions::default().with_portions(query.portions);
    let analysis = run(&state, RecipeSource::Url(query.url), options)
        .await
        .map_err(ApiError::envelope)?;
    Ok(Json(json!({ "success": true, "data": analysis })))
}

fn quick_summary(analysis: &RecipeAnalysis) -> String {
    let swaps = analysis.swaps.len();
    match analysis.health_score {
        8.. => format!(
            "Great recipe! {} ingredients analyzed.",
            analysis.all_ingredients.len()
        ),
        6..=7 => format!("Good recipe with {swaps} possible improvements."),
        _ => format!("Recipe could be healthier. {swaps} suggestions available."),
    }
}

pub async fn extension_analyze(
    State(state): State<AppState>,
    ExtensionQuery(query): ExtensionQuery<UrlQuery>,
) -> Result<Json<Value>, ApiError> {
    let options = AnalyseOptions::default().with_portions(query.portions);
    let analysis = run(&state, RecipeSource::Url(query.url), options)
        .await
        .map_err(ApiError::envelope)?;

    let healthy_count = analysis
        .all_ingredients
        .iter()
        .filter(|i| i.health_score >= 7)
        .count();
    let suggestions: Vec<&Swap> = analysis.swaps.iter().take(MAX_EXTENSION_SUGGESTIONS).collect();

    Ok(Json(json!({
        "success": true,
        "recipe_title": analysis.recipe_title,
        "health_score": analysis.health_score,
        "total_ingredients": analysis.all_ingredients.len(),
        "healthy_count": healthy_count,
        "suggestions": suggestions,
        "quick_summary": quick_summary(&analysis),
        "data": analysis,
    })))
}

pub async fn quick_check(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UrlQuery>,
) -> Result<Json<QuickCheck>, ApiError> {
    let analysis = run(&state, RecipeSource::Url(query.url), AnalyseOptions::quick()).await?;
    let score = f64::from(analysis.health_score);
    Ok(Json(QuickCheck {
        health_score: analysis.health_score,
        health_level: HealthLevel::from_score(score),
        badge_color: BadgeColor::from_score(score),
        ingredient_count: analysis.all_ingredients.len(),
    }))
}

pub async fn suggestions(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UrlQuery>,
) -> Result<Json<Suggestions>, ApiError> {
    let options = AnalyseOptions {
        include_explanation: false,
        ..AnalyseOptions::default()
    };
    let analysis = run(&state, RecipeSource::Url(query.url), options).await?;
    let total_possible_improvements = analysis.swaps.len();
    Ok(Json(Suggestions {
        current_score: analysis.health_score,
        swaps: analysis.swaps.into_iter().take(MAX_POPUP_SWAPS).collect(),
        total_possible_improvements,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let mut features = vec!["url_analysis", "text_analysis", "health_goals", "swaps"];
    if state.analyzer.resolver().has_source() {
        features.push("nutrition_database");
    }
    Json(json!({
        "status": "ok",
        "openai_available": state.openai_available,
        "version": VERSION,
        "features": features,
    }))
}

pub async fn chrome_health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": VERSION,
        "chrome_extension_ready": true,
    }))
}

pub async fn supported_sites() -> Json<Value> {
    Json(json!({ "sites": SITE_PROFILES, "total": SITE_PROFILES.len() }))
}

pub async fn learned_patterns(State(state): State<AppState>) -> Json<Value> {
    let patterns = state.analyzer.patterns().snapshot();
    Json(json!({ "total": patterns.len(), "patterns": patterns }))
}

pub async fn ingredient_description(
    AppQuery(query): AppQuery<IngredientQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = canonical_query_name(&query.name)?;
    let healthy = query
        .healthy
        .unwrap_or_else(|| table::lookup(&name).is_some_and(|(_, score)| score >= 7));
    Ok(Json(json!({
        "name": name,
        "healthy": healthy,
        "description": describe(&name, healthy),
    })))
}

pub async fn ingredient_substitutions(
    AppQuery(query): AppQuery<IngredientQuery>,
) -> Result<Json<Value>, ApiError> {
    let name = canonical_query_name(&query.name)?;
    let substitutions: Vec<Substitution> = find_substitution(&name).into_iter().collect();
    Ok(Json(json!({ "name": name, "substitutions": substitutions })))
}
