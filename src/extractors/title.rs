use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::filters::normalize_whitespace;
use super::json_ld;

pub const DEFAULT_TITLE: &str = "Recept";

const TITLE_CLASSES: &[&str] = &[
    "wprm-recipe-name",
    "tasty-recipes-title",
    "mv-create-title",
    "recipe-name",
    "recipe-title",
    "recipe-card-title",
    "recipe-header-title",
    "wpzoom-recipe-card-title",
    "recipe-card__title",
];

static TITLE_CLASS_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    let joined = TITLE_CLASSES
        .iter()
        .map(|class| format!(".{class}"))
        .collect::<Vec<_>>()
        .join(", ");
    Selector::parse(&joined).expect("valid selector")
});
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property='og:title']").expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|text| !text.is_empty())
}

/// Recipe title: structured data, recipe-card markup, then page headings
pub fn extract_title(document: &Html) -> String {
    json_ld::recipe_name(document)
        .or_else(|| first_text(document, &TITLE_CLASS_SELECTOR))
        .or_else(|| first_text(document, &H1))
        .or_else(|| {
            document
                .select(&OG_TITLE)
                .filter_map(|el| el.value().attr("content"))
                .map(normalize_whitespace)
                .find(|text| !text.is_empty())
        })
        .or_else(|| first_text(document, &TITLE))
        .map(|title| title.chars().take(200).collect())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
