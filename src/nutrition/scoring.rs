use crate::config::ScoringWeights;
use crate::model::NutritionFacts;

pub const MAX_SCORE: f64 = 10.0;

fn penalty(value: f64, threshold: f64, per_unit: f64, max: f64) -> f64 {
    ((value - threshold).max(0.0) * per_unit).min(max)
}

fn reward(value: f64, per_unit: f64, max: f64) -> f64 {
    (value.max(0.0) * per_unit).min(max)
}

/// Unrounded 0-10 score from per-100 g facts
pub fn score_facts_precise(facts: &NutritionFacts, weights: &ScoringWeights) -> f64 {
    let w = weights;
    let nova = facts
        .nova_group
        .map(|group| f64::from(group.saturating_sub(1)) * w.nova_per_group)
        .unwrap_or(0.0);

    let penalties = penalty(facts.calories, w.calories_threshold, w.calories_per_kcal, w.calories_max)
        + penalty(
            facts.saturated_fat_g,
            w.saturated_fat_threshold,
            w.saturated_fat_per_g,
            w.saturated_fat_max,
        )
        + penalty(facts.sugar_g, w.sugar_threshold, w.sugar_per_g, w.sugar_max)
        + penalty(facts.sodium_mg, w.sodium_threshold_mg, w.sodium_per_mg, w.sodium_max)
        + nova;
    let rewards = reward(facts.fiber_g, w.fiber_per_g, w.fiber_max)
        + reward(facts.protein_g, w.protein_per_g, w.protein_max);

    (MAX_SCORE - penalties + rewards).clamp(0.0, MAX_SCORE)
}

/// Integer 0-10 score from per-100 g facts
pub fn score_facts(facts: &NutritionFacts, weights: &ScoringWeights) -> u8 {
    score_facts_precise(facts, weights).round() as u8
}
