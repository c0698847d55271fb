//! Recipe-level scoring: totals, composite score, goal scores, swaps and
//! explanations.

mod explain;
mod facts;
pub mod goals;
mod swaps;

pub use explain::explain;
pub use facts::{describe, health_fact};
pub use goals::{GoalTable, GoalWeights};
pub use swaps::{find_substitution, Substitution};

use log::debug;
use std::collections::HashSet;

use crate::config::AppConfig;
use crate::model::{
    HealthClass, NutritionFacts, ParsedIngredient, RecipeAnalysis, ScoredIngredient, Swap,
};
use crate::nutrition::scoring::MAX_SCORE;
use crate::nutrition::Resolution;
use crate::parser;

/// Extra composite weight for an ingredient that makes up the whole known mass
const MASS_WEIGHT: f64 = 2.0;

/// What a caller wants computed for one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyseOptions {
    /// Overrides the configured default portion count
    pub portions: Option<u32>,
    pub include_swaps: bool,
    pub include_explanation: bool,
}

impl Default for AnalyseOptions {
    fn default() -> Self {
        Self {
            portions: None,
            include_swaps: true,
            include_explanation: true,
        }
    }
}

impl AnalyseOptions {
    /// Score only, for badge checks
    pub fn quick() -> Self {
        Self {
            portions: None,
            include_swaps: false,
            include_explanation: false,
        }
    }

    pub fn with_portions(mut self, portions: Option<u32>) -> Self {
        self.portions = portions;
        self
    }
}

pub struct RecipeAggregator {
    goals: GoalTable,
    swap_threshold: u8,
    default_portions: u32,
}

impl RecipeAggregator {
    pub fn new(goals: GoalTable, swap_threshold: u8, default_portions: u32) -> Self {
        Self {
            goals,
            swap_threshold,
            default_portions: default_portions.max(1),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            GoalTable::with_overrides(&config.goals),
            config.scoring.swap_threshold,
            config.scoring.default_portions,
        )
    }

    pub fn goals(&self) -> &GoalTable {
        &self.goals
    }

    /// Attach score, class and display notes to a parsed line
    pub fn annotate(&self, ingredient: ParsedIngredient, resolution: Resolution) -> ScoredIngredient {
        let score = resolution.health_score.min(MAX_SCORE as u8);
        let substitution = (score < self.swap_threshold)
            .then(|| find_substitution(&ingredient.name))
            .flatten()
            .map(|s| s.suggestion.to_string());

        ScoredIngredient {
            health_fact: health_fact(&ingredient.name).map(str::to_string),
            substitution,
            health_score: score,
            health_class: HealthClass::from_score(score),
            nutrition: resolution.facts,
            ingredient,
        }
    }

    pub fn aggregate(
        &self,
        title: &str,
        scored: Vec<ScoredIngredient>,
        options: AnalyseOptions,
    ) -> RecipeAnalysis {
        let mut seen = HashSet::new();
        let mut ingredients: Vec<ScoredIngredient> = scored
            .into_iter()
            .filter(|i| !i.name().is_empty() && seen.insert(i.name().to_string()))
            .collect();

        let portions = options
            .portions
            .filter(|p| *p > 0)
            .unwrap_or(self.default_portions);

        let masses: Vec<Option<f64>> = ingredients
            .iter()
            .map(|i| parser::grams(&i.ingredient).filter(|g| *g > 0.0))
            .collect();

        let mut total = NutritionFacts::default();
        let mut contributed = false;
        for (ingredient, mass) in ingredients.iter().zip(&masses) {
            if let (Some(facts), Some(mass)) = (&ingredient.nutrition, mass) {
                total += facts.scaled(mass / 100.0);
                contributed = true;
            }
        }
        let per_portion = total.scaled(1.0 / f64::from(portions));

        let known_mass: f64 = masses.iter().flatten().sum();
        let (weighted_sum, weight_total) = ingredients.iter().zip(&masses).fold(
            (0.0, 0.0),
            |(sum, weights), (ingredient, mass)| {
                let weight = match mass {
                    Some(mass) if known_mass > 0.0 => 1.0 + MASS_WEIGHT * mass / known_mass,
                    _ => 1.0,
                };
                (sum + weight * f64::from(ingredient.health_score), weights + weight)
            },
        );
        let precise = if weight_total > 0.0 {
            ((weighted_sum / weight_total) * 10.0).round() / 10.0
        } else {
            0.0
        }
        .clamp(0.0, MAX_SCORE);
        let health_score = precise.round() as u8;
        debug!(
            "Composite score {precise} from {} ingredients ({known_mass} g known)",
            ingredients.len()
        );

        let health_goals_scores = if contributed {
            self.goals.score(&per_portion)
        } else {
            self.goals.uniform(health_score)
        };

        let mut swaps: Vec<(u8, Swap)> = Vec::new();
        if options.include_swaps {
            for ingredient in ingredients
                .iter()
                .filter(|i| i.health_score < self.swap_threshold)
            {
                if let Some(substitution) = find_substitution(ingredient.name()) {
                    swaps.push((
                        ingredient.health_score,
                        Swap {
                            original: ingredient.name().to_string(),
                            suggestion: substitution.suggestion.to_string(),
                            reason: substitution.reason.to_string(),
                        },
                    ));
                }
            }
            swaps.sort_by_key(|(score, _)| *score);
        }

        ingredients.sort_by(|a, b| {
            b.health_score
                .cmp(&a.health_score)
                .then(b.substitution.is_some().cmp(&a.substitution.is_some()))
        });

        let health_explanation = if options.include_explanation {
            explain(&ingredients, precise, known_mass > 0.0)
        } else {
            Vec::new()
        };

        RecipeAnalysis {
            recipe_title: title.to_string(),
            portions,
            health_score,
            health_score_precise: precise,
            total_nutrition: total.rounded(),
            nutrition_per_portion: per_portion.rounded(),
            health_goals_scores,
            all_ingredients: ingredients,
            swaps: swaps.into_iter().map(|(_, swap)| swap).collect(),
            health_explanation,
        }
    }
}
