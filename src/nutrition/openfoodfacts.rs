use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::NutritionSource;
use crate::error::NutritionError;
use crate::model::NutritionFacts;

const SEARCH_PATH: &str = "/cgi/search.pl";
const KJ_PER_KCAL: f64 = 4.184;
/// Salt is roughly 40% sodium
const SALT_TO_SODIUM: f64 = 0.4;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    nutriments: HashMap<String, Value>,
    nova_group: Option<Value>,
}

/// OFF serves numbers both as JSON numbers and as strings
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

impl Product {
    fn nutriment(&self, key: &str) -> Option<f64> {
        self.nutriments.get(key).and_then(number)
    }

    fn per_100g(&self, key: &str) -> f64 {
        self.nutriment(&format!("{key}_100g")).unwrap_or(0.0)
    }

    fn into_facts(self) -> Option<NutritionFacts> {
        let calories = self
            .nutriment("energy-kcal_100g")
            .or_else(|| self.nutriment("energy_100g").map(|kj| kj / KJ_PER_KCAL));
        let sodium_g = self
            .nutriment("sodium_100g")
            .or_else(|| self.nutriment("salt_100g").map(|salt| salt * SALT_TO_SODIUM));

        let has_macros = ["proteins_100g", "carbohydrates_100g", "fat_100g"]
            .iter()
            .any(|key| self.nutriment(key).is_some());
        if calories.is_none() && !has_macros {
            return None;
        }

        let nova_group = self
            .nova_group
            .as_ref()
            .and_then(number)
            .map(|n| n as u8)
            .filter(|n| (1..=4).contains(n));

        Some(NutritionFacts {
            calories: calories.unwrap_or(0.0),
            protein_g: self.per_100g("proteins"),
            carbs_g: self.per_100g("carbohydrates"),
            fat_g: self.per_100g("fat"),
            fiber_g: self.per_100g("fiber"),
            sugar_g: self.per_100g("sugars"),
            saturated_fat_g: self.per_100g("saturated-fat"),
            sodium_mg: sodium_g.unwrap_or(0.0) * 1000.0,
            potassium_mg: self.per_100g("potassium") * 1000.0,
            calcium_mg: self.per_100g("calcium") * 1000.0,
            iron_mg: self.per_100g("iron") * 1000.0,
            vitamin_c_mg: self.per_100g("vitamin-c") * 1000.0,
            nova_group,
        })
    }
}

/// Open Food Facts product search, first hit only
pub struct OpenFoodFactsClient {
    base_url: String,
    client: Client,
}

impl OpenFoodFactsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NutritionError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("silverfood/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn search_url(&self, query: &str) -> Result<url::Url, NutritionError> {
        url::Url::parse_with_params(
            &format!("{}{}", self.base_url, SEARCH_PATH),
            &[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", "1"),
            ],
        )
        .map_err(|e| NutritionError::Decode(format!("invalid search url: {e}")))
    }
}

#[async_trait]
impl NutritionSource for OpenFoodFactsClient {
    async fn lookup(&self, query: &str) -> Result<Option<NutritionFacts>, NutritionError> {
        let url = self.search_url(query)?;
        debug!("Looking up nutrition for '{query}'");

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| NutritionError::Decode(e.to_string()))?;

        Ok(body.products.into_iter().next().and_then(Product::into_facts))
    }
}
