use log::debug;
use scraper::Selector;

use super::filters::screen_lines;
use super::{element_text, Candidates, Extractor, ParsingContext};

/// Common ingredient-list selectors, most specific first
const GENERIC_SELECTORS: &[&str] = &[
    ".ingredients li",
    ".recipe-ingredients li",
    ".ingredient-list li",
    ".ingredients-list li",
    ".recipe-ingredient",
    ".ingredient",
    "[data-ingredient]",
];

/// Recipe-card plugin containers (WordPress and friends)
const PLUGIN_CLASSES: &[&str] = &[
    "wprm-recipe-ingredient",
    "wprm-recipe-ingredients-container",
    "tasty-recipes-ingredients",
    "mv-create-ingredients",
    "recipe-card-ingredients",
    "wpzoom-recipe-ingredients",
    "recipe-ingredients-section",
    "simple-recipe-pro-recipe-ingredients",
    "wpupg-recipe-ingredients",
    "recipe-card-ingredient-list",
    "recipe_ingredients",
    "structured-ingredients",
    "mpprecipe-ingredients",
    "recipe-ingredient-group",
];

/// Broad substring matches, only used after everything above
const FUZZY_SELECTORS: &[&str] = &["[class*='ingredient'] li", "[class*='ingredient']"];

/// Every selector the generic strategy tries, in order
pub fn candidate_selectors() -> Vec<String> {
    let mut selectors: Vec<String> = GENERIC_SELECTORS.iter().map(|s| s.to_string()).collect();
    for class in PLUGIN_CLASSES {
        selectors.push(format!(".{class} li"));
        selectors.push(format!(".{class}"));
    }
    selectors.extend(FUZZY_SELECTORS.iter().map(|s| s.to_string()));
    selectors
}

/// Lines matched by one selector, screened with the ingredient heuristic
pub fn select_lines(context: &ParsingContext, raw_selector: &str) -> Vec<String> {
    match Selector::parse(raw_selector) {
        Ok(selector) => screen_lines(context.document.select(&selector).map(element_text), true),
        Err(_) => {
            debug!("HtmlClassExtractor: invalid selector {raw_selector}");
            Vec::new()
        }
    }
}

pub struct HtmlClassExtractor {
    selectors: Vec<String>,
}

impl HtmlClassExtractor {
    pub fn new() -> Self {
        Self {
            selectors: candidate_selectors(),
        }
    }
}

impl Default for HtmlClassExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for HtmlClassExtractor {
    fn name(&self) -> &'static str {
        "html_class"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Candidates> {
        self.selectors.iter().find_map(|selector| {
            let lines = select_lines(context, selector);
            if lines.is_empty() {
                return None;
            }
            debug!("HtmlClassExtractor: {} lines via {}", lines.len(), selector);
            Some(Candidates::new(self.name(), Some(selector.as_str()), lines))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_list() {
        let html = r#"
            <ul class="ingredients">
                <li>200 g bloem</li>
                <li>2 eieren</li>
                <li>Bereidingstijd: 20 minuten</li>
                <li>250 ml melk</li>
            </ul>"#;
        let context = ParsingContext::new("https://example.com/pannenkoeken", html);
        let candidates = HtmlClassExtractor::new().extract(&context).unwrap();
        assert_eq!(candidates.selector.as_deref(), Some(".ingredients li"));
        assert_eq!(candidates.lines, vec!["200 g bloem", "2 eieren", "250 ml melk"]);
    }

    #[test]
    fn test_plugin_class() {
        let html = r#"
            <div class="tasty-recipes-ingredients">
                <ul><li>1 ui</li><li>2 teentjes knoflook</li></ul>
            </div>"#;
        let context = ParsingContext::new("https://example.com/saus", html);
        let candidates = HtmlClassExtractor::new().extract(&context).unwrap();
        assert_eq!(candidates.selector.as_deref(), Some(".tasty-recipes-ingredients li"));
        assert_eq!(candidates.lines.len(), 2);
    }

    #[test]
    fn test_nothing_matching() {
        let context = ParsingContext::new(
            "https://example.com/",
            "<ul class='menu'><li>Home</li><li>Contact</li></ul>",
        );
        assert!(HtmlClassExtractor::new().extract(&context).is_none());
    }
}
