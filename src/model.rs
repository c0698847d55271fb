use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Where a recipe comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSource {
    /// Page to scrape
    Url(String),
    /// Raw pasted ingredient or recipe text
    Text(String),
}

/// A single extracted fragment, before parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIngredientLine {
    pub text: String,
    /// Selector or strategy that produced the line
    pub source: String,
    /// Position within the extracted list
    pub position: usize,
}

/// Output of the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecipe {
    pub title: String,
    pub lines: Vec<RawIngredientLine>,
}

/// Structured ingredient line.
///
/// `quantity` and `unit` are either both present or both absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    /// Canonical lowercase name, used as the lookup key
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub original_text: String,
}

/// Nutrition facts per 100 g
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub saturated_fat_g: f64,
    pub sodium_mg: f64,
    pub potassium_mg: f64,
    pub calcium_mg: f64,
    pub iron_mg: f64,
    pub vitamin_c_mg: f64,
    /// NOVA processing group 1 (unprocessed) to 4 (ultra-processed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nova_group: Option<u8>,
}

/// Addressable nutrient of [`NutritionFacts`], used by the goal tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    ProteinG,
    CarbsG,
    FatG,
    FiberG,
    SugarG,
    SaturatedFatG,
    SodiumMg,
    PotassiumMg,
    CalciumMg,
    IronMg,
    VitaminCMg,
}

impl NutritionFacts {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::ProteinG => self.protein_g,
            Nutrient::CarbsG => self.carbs_g,
            Nutrient::FatG => self.fat_g,
            Nutrient::FiberG => self.fiber_g,
            Nutrient::SugarG => self.sugar_g,
            Nutrient::SaturatedFatG => self.saturated_fat_g,
            Nutrient::SodiumMg => self.sodium_mg,
            Nutrient::PotassiumMg => self.potassium_mg,
            Nutrient::CalciumMg => self.calcium_mg,
            Nutrient::IronMg => self.iron_mg,
            Nutrient::VitaminCMg => self.vitamin_c_mg,
        }
    }

    /// Multiply every amount by `factor`; the NOVA group is dropped
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g * factor,
            sugar_g: self.sugar_g * factor,
            saturated_fat_g: self.saturated_fat_g * factor,
            sodium_mg: self.sodium_mg * factor,
            potassium_mg: self.potassium_mg * factor,
            calcium_mg: self.calcium_mg * factor,
            iron_mg: self.iron_mg * factor,
            vitamin_c_mg: self.vitamin_c_mg * factor,
            nova_group: None,
        }
    }

    /// Round every amount to one decimal for display
    pub fn rounded(&self) -> Self {
        let r = |v: f64| (v * 10.0).round() / 10.0;
        Self {
            calories: r(self.calories),
            protein_g: r(self.protein_g),
            carbs_g: r(self.carbs_g),
            fat_g: r(self.fat_g),
            fiber_g: r(self.fiber_g),
            sugar_g: r(self.sugar_g),
            saturated_fat_g: r(self.saturated_fat_g),
            sodium_mg: r(self.sodium_mg),
            potassium_mg: r(self.potassium_mg),
            calcium_mg: r(self.calcium_mg),
            iron_mg: r(self.iron_mg),
            vitamin_c_mg: r(self.vitamin_c_mg),
            nova_group: self.nova_group,
        }
    }
}

impl Add for NutritionFacts {
    type Output = NutritionFacts;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for NutritionFacts {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein_g += rhs.protein_g;
        self.carbs_g += rhs.carbs_g;
        self.fat_g += rhs.fat_g;
        self.fiber_g += rhs.fiber_g;
        self.sugar_g += rhs.sugar_g;
        self.saturated_fat_g += rhs.saturated_fat_g;
        self.sodium_mg += rhs.sodium_mg;
        self.potassium_mg += rhs.potassium_mg;
        self.calcium_mg += rhs.calcium_mg;
        self.iron_mg += rhs.iron_mg;
        self.vitamin_c_mg += rhs.vitamin_c_mg;
        self.nova_group = None;
    }
}

/// Coarse classification every consumer colors by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthClass {
    Healthy,
    Neutral,
    Unhealthy,
}

impl HealthClass {
    /// ≥7 healthy, 4–6 neutral, <4 unhealthy
    pub fn from_score(score: u8) -> Self {
        match score {
            7.. => HealthClass::Healthy,
            4..=6 => HealthClass::Neutral,
            _ => HealthClass::Unhealthy,
        }
    }
}

impl fmt::Display for HealthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthClass::Healthy => write!(f, "healthy"),
            HealthClass::Neutral => write!(f, "neutral"),
            HealthClass::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Toolbar badge bucket for the browser extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Yellow,
    Orange,
    Red,
}

impl BadgeColor {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            BadgeColor::Green
        } else if score >= 6.0 {
            BadgeColor::Yellow
        } else if score >= 4.0 {
            BadgeColor::Orange
        } else {
            BadgeColor::Red
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            HealthLevel::Excellent
        } else if score >= 6.0 {
            HealthLevel::Good
        } else if score >= 4.0 {
            HealthLevel::Fair
        } else {
            HealthLevel::Poor
        }
    }
}

/// Parsed ingredient with its score and display extras
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredIngredient {
    #[serde(flatten)]
    pub ingredient: ParsedIngredient,
    pub health_score: u8,
    pub health_class: HealthClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_fact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution: Option<String>,
    /// Per-100g facts when the nutrition database knew the ingredient
    pub nutrition: Option<NutritionFacts>,
}

impl ScoredIngredient {
    pub fn name(&self) -> &str {
        &self.ingredient.name
    }
}

/// Suggested substitution for a low-scoring ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    pub original: String,
    pub suggestion: String,
    pub reason: String,
}

/// Full analysis response; built once per request and never mutated afterwards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeAnalysis {
    pub recipe_title: String,
    pub portions: u32,
    /// Composite score rounded to an integer
    pub health_score: u8,
    /// Composite score with one decimal
    pub health_score_precise: f64,
    pub total_nutrition: NutritionFacts,
    pub nutrition_per_portion: NutritionFacts,
    pub health_goals_scores: BTreeMap<String, u8>,
    pub all_ingredients: Vec<ScoredIngredient>,
    pub swaps: Vec<Swap>,
    pub health_explanation: Vec<String>,
}
