use log::debug;
use scraper::Selector;
use serde::Serialize;

use super::filters::screen_lines;
use super::{element_text, Candidates, Extractor, ParsingContext};

/// Hand-tuned selectors for a recipe site
#[derive(Debug, Clone, Serialize)]
pub struct SiteProfile {
    pub name: &'static str,
    pub domain: &'static str,
    pub example_url: &'static str,
    #[serde(skip)]
    pub ingredient_selectors: &'static [&'static str],
}

impl SiteProfile {
    pub fn matches(&self, domain: &str) -> bool {
        domain == self.domain || domain.ends_with(&format!(".{}", self.domain))
    }
}

pub const SITE_PROFILES: &[SiteProfile] = &[
    SiteProfile {
        name: "AH Allerhande",
        domain: "ah.nl",
        example_url:
            "https://www.ah.nl/allerhande/recept/R-R1201256/orzosalade-met-asperges-nectarines-en-burrata",
        ingredient_selectors: &[
            "[data-testhook='ingredients'] tr",
            "[data-testhook='ingredients'] td:last-child p",
            "[class*='recipe-ingredients-ingredient-list_name']",
            "[class*='ingredient-list'] li",
        ],
    },
    SiteProfile {
        name: "Jumbo Recepten",
        domain: "jumbo.com",
        example_url: "https://www.jumbo.com/recepten/pasta-met-doperwten-ricotta-en-munt-999966",
        ingredient_selectors: &[
            ".ingredient-line",
            "[data-testid='ingredient']",
            ".ingredients-list li",
        ],
    },
    SiteProfile {
        name: "Leuke Recepten",
        domain: "leukerecepten.nl",
        example_url: "https://www.leukerecepten.nl/recepten/couscous-salade-met-feta/",
        ingredient_selectors: &[
            ".wprm-recipe-ingredient",
            ".recipe-ingredients li",
            ".ingredients li",
        ],
    },
    SiteProfile {
        name: "24Kitchen",
        domain: "24kitchen.nl",
        example_url: "https://www.24kitchen.nl/recepten/",
        ingredient_selectors: &[
            ".recipe-ingredients li",
            ".ingredients-list li",
            "[class*='ingredients'] li",
        ],
    },
];

/// Profile for a domain, if one exists
pub fn profile_for(domain: &str) -> Option<&'static SiteProfile> {
    SITE_PROFILES.iter().find(|p| p.matches(domain))
}

pub struct SiteExtractor;

impl Extractor for SiteExtractor {
    fn name(&self) -> &'static str {
        "site"
    }

    fn extract(&self, context: &ParsingContext) -> Option<Candidates> {
        let profile = profile_for(&context.domain)?;
        debug!("SiteExtractor: using profile {}", profile.name);

        for raw_selector in profile.ingredient_selectors {
            let Ok(selector) = Selector::parse(raw_selector) else {
                continue;
            };
            let lines = screen_lines(context.document.select(&selector).map(element_text), false);
            if !lines.is_empty() {
                return Some(Candidates::new(self.name(), Some(*raw_selector), lines));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_matches_subdomains() {
        assert_eq!(profile_for("ah.nl").map(|p| p.name), Some("AH Allerhande"));
        assert_eq!(profile_for("m.jumbo.com").map(|p| p.name), Some("Jumbo Recepten"));
        assert!(profile_for("notjumbo.com").is_none());
    }

    #[test]
    fn test_extracts_table_rows() {
        let html = r#"
            <table data-testhook="ingredients">
                <tr><td>200 g</td><td><p>orzo</p></td></tr>
                <tr><td>250 g</td><td><p>groene asperges</p></td></tr>
                <tr><td>2</td><td><p>nectarines</p></td></tr>
            </table>"#;
        let context = ParsingContext::new("https://www.ah.nl/allerhande/recept/R-1/x", html);
        let candidates = SiteExtractor.extract(&context).unwrap();
        assert_eq!(
            candidates.lines,
            vec!["200 g orzo", "250 g groene asperges", "2 nectarines"]
        );
    }

    #[test]
    fn test_unknown_domain_is_skipped() {
        let context = ParsingContext::new(
            "https://example.com/recipe",
            "<ul class='ingredients'><li>1 ui</li></ul>",
        );
        assert!(SiteExtractor.extract(&context).is_none());
    }
}
