use log::debug;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use super::filters::{normalize_whitespace, screen_lines};
use super::{Candidates, Extractor, ParsingContext};

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").expect("valid selector"));

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Strings(Vec<String>),
    Objects(Vec<IngredientObject>),
    Single(String),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: Option<String>,
    text: Option<String>,
    amount: Option<String>,
}

impl RecipeIngredients {
    fn into_lines(self) -> Vec<String> {
        match self {
            RecipeIngredients::Strings(lines) => lines,
            RecipeIngredients::Single(line) => line.lines().map(str::to_string).collect(),
            RecipeIngredients::Objects(objects) => objects
                .into_iter()
                .filter_map(|o| {
                    let name = o.name.or(o.text)?;
                    Some(match o.amount {
                        Some(amount) if !amount.trim().is_empty() => format!("{amount} {name}"),
                        _ => name,
                    })
                })
                .collect(),
        }
    }
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .any(|kind| kind.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Locate the Recipe node in a parsed JSON-LD block
fn find_recipe(json_ld: &Value) -> Option<&Value> {
    if let Some(items) = json_ld.as_array() {
        return items.iter().find_map(find_recipe);
    }
    if is_recipe_type(json_ld) {
        return Some(json_ld);
    }
    json_ld
        .get("@graph")
        .and_then(Value::as_array)
        .and_then(|graph| graph.iter().find(|item| is_recipe_type(item)))
}

/// Every Recipe node found in the page's JSON-LD scripts
fn recipe_nodes(document: &Html) -> Vec<Value> {
    let mut recipes = Vec::new();
    for (index, script) in document.select(&SCRIPT_SELECTOR).enumerate() {
        let cleaned = sanitize_json(&script.inner_html());
        match serde_json::from_str::<Value>(&cleaned) {
            Ok(json_ld) => {
                if let Some(recipe) = find_recipe(&json_ld) {
                    recipes.push(recipe.clone());
                } else {
                    debug!("JsonLdExtractor: no recipe in script {index}");
                }
            }
            Err(e) => debug!("JsonLdExtractor: failed to parse script {index}: {e}"),
        }
    }
    recipes
}

/// The recipe's `name`, when the page declares one
pub fn recipe_name(document: &Html) -> Option<String> {
    recipe_nodes(document).into_iter().find_map(|recipe| {
        recipe
            .get("name")
            .and_then(Value::as_str)
            .map(normalize_whitespace)
            .filter(|name| !name.is_empty())
    })
}

pub struct JsonLdExtractor;

impl Extractor for JsonLdExtractor {
    fn name(&self) -> &'static str {
        "json_ld"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Candidates> {
        for recipe in recipe_nodes(&context.document) {
            let Some(raw) = recipe
                .get("recipeIngredient")
                .or_else(|| recipe.get("ingredients"))
            else {
                continue;
            };
            let ingredients = match RecipeIngredients::deserialize(raw) {
                Ok(ingredients) => ingredients,
                Err(e) => {
                    debug!("JsonLdExtractor: unexpected recipeIngredient shape: {e}");
                    continue;
                }
            };
            let lines = screen_lines(ingredients.into_lines(), false);
            if !lines.is_empty() {
                return Some(Candidates::new(self.name(), None, lines));
            }
        }
        None
    }
}

/// Repair the usual hand-written JSON-LD defects: missing commas between
/// values, doubled or trailing commas, and stray newlines outside strings.
pub(crate) fn sanitize_json(json_str: &str) -> String {
    let chars: Vec<char> = json_str.chars().collect();
    let mut out = String::with_capacity(json_str.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut depth = 0i32;

    let next_significant =
        |from: usize| chars.get(from..).and_then(|rest| rest.iter().copied().find(|c| !c.is_whitespace()));

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => {
                    in_string = false;
                    out.push(c);
                    // "a" "b" inside a container is a missing comma
                    if depth > 0 && matches!(next_significant(i + 1), Some('"' | '[' | '{')) {
                        out.push(',');
                    }
                    continue;
                }
                '\n' | '\r' | '\t' => {
                    out.push(' ');
                    continue;
                }
                _ => {}
            }
            out.push(c);
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                depth += 1;
                out.push(c);
            }
            '}' | ']' => {
                depth -= 1;
                while out.ends_with(',') {
                    out.pop();
                }
                out.push(c);
                if depth > 0 && matches!(next_significant(i + 1), Some('"' | '{' | '[')) {
                    out.push(',');
                }
            }
            ',' => {
                if !out.ends_with(',') && !out.ends_with('[') && !out.ends_with('{') {
                    out.push(c);
                }
            }
            c if c.is_whitespace() => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json_ld: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html><head>
            <script type="application/ld+json">{json_ld}</script>
            </head><body></body></html>"#
        )
    }

    #[test]
    fn test_recipe_ingredient_strings() {
        let html = page(
            r#"{"@context":"https://schema.org","@type":"Recipe","name":"Pasta pesto",
                "recipeIngredient":["250 g pasta","1 pot pesto","50 g pijnboompitten"]}"#,
        );
        let context = ParsingContext::new("https://example.com/pesto", &html);
        let candidates = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(
            candidates.lines,
            vec!["250 g pasta", "1 pot pesto", "50 g pijnboompitten"]
        );
        assert_eq!(recipe_name(&context.document).as_deref(), Some("Pasta pesto"));
    }

    #[test]
    fn test_recipe_in_graph_with_type_array() {
        let html = page(
            r#"{"@graph":[{"@type":"WebPage","name":"Site"},
                {"@type":["Recipe","NewsArticle"],"name":"Soep",
                 "recipeIngredient":["1 ui","2 wortels","1 l bouillon"]}]}"#,
        );
        let context = ParsingContext::new("https://example.com/soep", &html);
        let candidates = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(candidates.lines.len(), 3);
        assert_eq!(recipe_name(&context.document).as_deref(), Some("Soep"));
    }

    #[test]
    fn test_ingredient_objects() {
        let html = page(
            r#"[{"@type":"Recipe","recipeIngredient":[
                {"name":"bloem","amount":"200 g"},{"name":"suiker","amount":""}]}]"#,
        );
        let context = ParsingContext::new("https://example.com/cake", &html);
        let candidates = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(candidates.lines, vec!["200 g bloem", "suiker"]);
    }

    #[test]
    fn test_sanitize_missing_and_trailing_commas() {
        let broken = r#"{"@type": "Recipe", "recipeIngredient": ["1 ui" "2 tomaten",], }"#;
        let value: Value = serde_json::from_str(&sanitize_json(broken)).unwrap();
        assert_eq!(value["recipeIngredient"][1], "2 tomaten");
    }

    #[test]
    fn test_no_recipe_node() {
        let html = page(r#"{"@type":"Organization","name":"Acme"}"#);
        let context = ParsingContext::new("https://example.com", &html);
        assert!(JsonLdExtractor.extract(&context).is_none());
        assert!(recipe_name(&context.document).is_none());
    }
}
