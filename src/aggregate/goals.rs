//! Health-goal scoring as data: each goal is a base score plus weighted
//! nutrient terms, evaluated on per-portion nutrition.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::model::{Nutrient, NutritionFacts};

/// A term's contribution saturates at this multiple of its reference amount
const MAX_RATIO: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTerm {
    pub nutrient: Nutrient,
    /// Score change at the reference amount; negative for penalties
    pub weight: f64,
    /// Per-portion amount at which the full weight applies
    pub reference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalWeights {
    pub base: f64,
    #[serde(default)]
    pub terms: Vec<GoalTerm>,
}

impl GoalWeights {
    pub fn score(&self, per_portion: &NutritionFacts) -> u8 {
        let total = self
            .terms
            .iter()
            .filter(|term| term.reference > 0.0)
            .map(|term| {
                let ratio = (per_portion.get(term.nutrient) / term.reference).clamp(0.0, MAX_RATIO);
                term.weight * ratio
            })
            .sum::<f64>()
            + self.base;
        total.clamp(0.0, 10.0).round() as u8
    }
}

use Nutrient::*;

type GoalRow = (&'static str, f64, &'static [(Nutrient, f64, f64)]);

const DEFAULT_GOALS: &[GoalRow] = &[
    (
        "weight_loss",
        8.0,
        &[
            (Calories, -3.0, 600.0),
            (SugarG, -2.0, 25.0),
            (FatG, -1.0, 30.0),
            (FiberG, 1.5, 8.0),
            (ProteinG, 1.0, 25.0),
        ],
    ),
    (
        "heart_health",
        7.5,
        &[
            (SaturatedFatG, -3.0, 10.0),
            (SodiumMg, -2.5, 800.0),
            (FiberG, 1.5, 8.0),
            (PotassiumMg, 1.0, 1000.0),
        ],
    ),
    (
        "diabetes_control",
        8.0,
        &[
            (SugarG, -3.5, 25.0),
            (CarbsG, -1.5, 75.0),
            (FiberG, 2.0, 8.0),
            (ProteinG, 0.5, 25.0),
        ],
    ),
    (
        "muscle_building",
        4.0,
        &[(ProteinG, 4.0, 35.0), (Calories, 1.0, 600.0), (CarbsG, 0.5, 60.0)],
    ),
    (
        "bone_health",
        5.0,
        &[
            (CalciumMg, 3.0, 400.0),
            (ProteinG, 1.0, 25.0),
            (VitaminCMg, 0.5, 30.0),
            (SodiumMg, -1.5, 1000.0),
        ],
    ),
    (
        "immune_system",
        5.0,
        &[
            (VitaminCMg, 3.0, 40.0),
            (IronMg, 1.0, 5.0),
            (FiberG, 1.0, 8.0),
            (SugarG, -1.5, 25.0),
        ],
    ),
    (
        "brain_health",
        6.0,
        &[
            (SaturatedFatG, -2.0, 10.0),
            (SugarG, -1.5, 25.0),
            (IronMg, 1.5, 5.0),
            (FiberG, 1.0, 8.0),
        ],
    ),
    (
        "energy_boost",
        5.0,
        &[
            (CarbsG, 2.0, 60.0),
            (FiberG, 1.0, 5.0),
            (IronMg, 1.0, 5.0),
            (SugarG, -2.0, 20.0),
        ],
    ),
    (
        "blood_pressure",
        8.0,
        &[
            (SodiumMg, -4.0, 800.0),
            (PotassiumMg, 1.5, 1000.0),
            (FiberG, 1.0, 8.0),
            (SaturatedFatG, -1.0, 10.0),
        ],
    ),
    (
        "general_health",
        6.0,
        &[
            (FiberG, 1.5, 6.0),
            (ProteinG, 1.0, 15.0),
            (SugarG, -1.5, 15.0),
            (SodiumMg, -1.5, 400.0),
            (SaturatedFatG, -1.0, 10.0),
        ],
    ),
];

/// Named goals with their weights, built-ins first then configured overrides
#[derive(Debug, Clone)]
pub struct GoalTable {
    goals: BTreeMap<String, GoalWeights>,
}

impl Default for GoalTable {
    fn default() -> Self {
        let goals = DEFAULT_GOALS
            .iter()
            .map(|(name, base, terms)| {
                let terms = terms
                    .iter()
                    .map(|&(nutrient, weight, reference)| GoalTerm {
                        nutrient,
                        weight,
                        reference,
                    })
                    .collect();
                (name.to_string(), GoalWeights { base: *base, terms })
            })
            .collect();
        Self { goals }
    }
}

impl GoalTable {
    /// Built-in goals with `overrides` replacing or adding entries
    pub fn with_overrides(overrides: &HashMap<String, GoalWeights>) -> Self {
        let mut table = Self::default();
        for (name, weights) in overrides {
            table.goals.insert(name.clone(), weights.clone());
        }
        table
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.goals.keys().map(String::as_str)
    }

    pub fn score(&self, per_portion: &NutritionFacts) -> BTreeMap<String, u8> {
        self.goals
            .iter()
            .map(|(name, weights)| (name.clone(), weights.score(per_portion)))
            .collect()
    }

    /// Every goal set to the same score, for recipes without nutrition data
    pub fn uniform(&self, score: u8) -> BTreeMap<String, u8> {
        self.goals.keys().map(|name| (name.clone(), score)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_goals_present() {
        let table = GoalTable::default();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names.len(), 10);
        assert!(names.contains(&"heart_health"));
        assert!(names.contains(&"general_health"));
    }

    #[test]
    fn test_heart_health_penalises_saturated_fat() {
        let table = GoalTable::default();
        let lean = NutritionFacts {
            fiber_g: 8.0,
            potassium_mg: 1000.0,
            ..NutritionFacts::default()
        };
        let fatty = NutritionFacts {
            saturated_fat_g: 20.0,
            sodium_mg: 1600.0,
            ..NutritionFacts::default()
        };
        assert_eq!(table.score(&lean)["heart_health"], 10);
        assert_eq!(table.score(&fatty)["heart_health"], 0);
    }

    #[test]
    fn test_muscle_building_rewards_protein() {
        let table = GoalTable::default();
        let protein = NutritionFacts {
            protein_g: 35.0,
            ..NutritionFacts::default()
        };
        assert_eq!(table.score(&NutritionFacts::default())["muscle_building"], 4);
        assert_eq!(table.score(&protein)["muscle_building"], 8);
    }

    #[test]
    fn test_overrides_replace_and_add() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "low_sugar".to_string(),
            GoalWeights {
                base: 9.0,
                terms: vec![GoalTerm {
                    nutrient: Nutrient::SugarG,
                    weight: -3.0,
                    reference: 20.0,
                }],
            },
        );
        overrides.insert(
            "weight_loss".to_string(),
            GoalWeights {
                base: 2.0,
                terms: vec![],
            },
        );
        let table = GoalTable::with_overrides(&overrides);
        let sweet = NutritionFacts {
            sugar_g: 20.0,
            ..NutritionFacts::default()
        };
        let scores = table.score(&sweet);
        assert_eq!(scores.len(), 11);
        assert_eq!(scores["low_sugar"], 6);
        assert_eq!(scores["weight_loss"], 2);
    }
}
