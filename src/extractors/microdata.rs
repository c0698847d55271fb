use log::debug;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::filters::screen_lines;
use super::{element_text, Candidates, Extractor, ParsingContext};

static ITEMSCOPE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemscope]").expect("valid selector"));

const INGREDIENT_PROPS: &[&str] = &["recipeIngredient", "ingredients"];

pub struct MicroDataExtractor;

impl MicroDataExtractor {
    /// Ingredient itemprops are only trusted inside a schema.org Recipe scope
    fn find_recipe_container(document: &Html) -> Option<ElementRef<'_>> {
        document.select(&ITEMSCOPE).find(|element| {
            element.value().attr("itemtype").is_some_and(|itemtype| {
                itemtype.contains("schema.org/Recipe")
                    || itemtype.contains("data-vocabulary.org/Recipe")
            })
        })
    }

    fn get_itemprop_list(root: ElementRef<'_>, prop: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(&format!("[itemprop='{prop}']")) else {
            return Vec::new();
        };
        root.select(&selector)
            .map(|el| {
                // <meta itemprop="recipeIngredient" content="...">
                el.value()
                    .attr("content")
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(el))
            })
            .filter(|text| !text.trim().is_empty())
            .collect()
    }
}

impl Extractor for MicroDataExtractor {
    fn name(&self) -> &'static str {
        "microdata"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Candidates> {
        let container = Self::find_recipe_container(&context.document)?;
        debug!("MicroDataExtractor: found Recipe container");

        INGREDIENT_PROPS.iter().find_map(|prop| {
            let lines = screen_lines(Self::get_itemprop_list(container, prop), false);
            (!lines.is_empty()).then(|| Candidates::new(self.name(), None, lines))
        })
    }
}
