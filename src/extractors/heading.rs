use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::filters::screen_lines;
use super::{element_text, Candidates, Extractor, ParsingContext};

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6, strong, b, p").expect("valid selector"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid selector"));

const HEADING_WORDS: &[&str] = &[
    "ingrediënten",
    "ingredienten",
    "ingredients",
    "benodigdheden",
    "wat heb je nodig",
];

fn is_ingredient_heading(element: ElementRef<'_>) -> bool {
    let text = element_text(element).to_lowercase();
    let text = text.trim().trim_end_matches(':').trim();
    text.chars().count() <= 40 && HEADING_WORDS.iter().any(|word| text.starts_with(word))
}

fn is_heading_tag(element: ElementRef<'_>) -> bool {
    matches!(
        element.value().name(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
    )
}

/// First list after the heading, looking past a wrapper element if needed
fn following_list(heading: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let wrapper = heading.parent().and_then(ElementRef::wrap);
    for anchor in std::iter::once(heading).chain(wrapper) {
        for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
            if matches!(sibling.value().name(), "ul" | "ol") {
                return Some(sibling);
            }
            if sibling.select(&LIST_ITEM).next().is_some() {
                return Some(sibling);
            }
            if is_heading_tag(sibling) {
                break;
            }
        }
    }
    None
}

/// List items that follow an "Ingrediënten" style heading
pub struct HeadingExtractor;

impl Extractor for HeadingExtractor {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Candidates> {
        context
            .document
            .select(&HEADING_SELECTOR)
            .filter(|element| is_ingredient_heading(*element))
            .filter_map(following_list)
            .find_map(|list| {
                let lines = screen_lines(list.select(&LIST_ITEM).map(element_text), true);
                (!lines.is_empty()).then(|| Candidates::new(self.name(), None, lines))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_after_heading() {
        let html = r#"
            <article>
                <h2>Ingrediënten</h2>
                <ul><li>300 g spaghetti</li><li>1 courgette</li><li>snufje zout</li></ul>
                <h2>Bereiding</h2>
                <ol><li>Kook de pasta in ruim water.</li></ol>
            </article>"#;
        let context = ParsingContext::new("https://blog.example.com/pasta", html);
        let candidates = HeadingExtractor.extract(&context).unwrap();
        assert_eq!(
            candidates.lines,
            vec!["300 g spaghetti", "1 courgette", "snufje zout"]
        );
    }

    #[test]
    fn test_heading_inside_wrapper() {
        let html = r#"
            <div class="header"><h3>Ingredients:</h3></div>
            <div class="body"><ul><li>2 eggs</li><li>100 g sugar</li></ul></div>"#;
        let context = ParsingContext::new("https://blog.example.com/cake", html);
        let candidates = HeadingExtractor.extract(&context).unwrap();
        assert_eq!(candidates.lines, vec!["2 eggs", "100 g sugar"]);
    }

    #[test]
    fn test_no_heading() {
        let context = ParsingContext::new(
            "https://blog.example.com/",
            "<h2>Over mij</h2><ul><li>1 ui</li></ul>",
        );
        assert!(HeadingExtractor.extract(&context).is_none());
    }
}
