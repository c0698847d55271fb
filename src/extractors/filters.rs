//! Line cleanup and ingredient-likeness heuristics shared by all strategies.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::nutrition::table::is_known_ingredient;

pub const MIN_LINE_CHARS: usize = 3;
pub const MAX_LINE_CHARS: usize = 200;

/// Lines built from these words are page furniture, not ingredients
static SKIP_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(recepten?|stap|bereiding|bereidingstijd|bereidingswijze|instructies?|minuten|uur|serveren|porties|personen|moeilijkheid|voorbereiding|benodigdheden|variaties|reviews?|beoordelingen|rating|sterren|voedingswaarden?|kcal|step|minutes|servings|print|comments?|nutrition)\b",
    )
    .expect("valid regex")
});

static QUANTITY_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d|[½¼¾⅓⅔⅛])|\b(gram|gr|g|kg|mg|ml|cl|dl|l|liter|el|eetlepels?|tl|theelepels?|stuks?|teentjes?|teen|kopjes?|blik|blikje|blikken|pak|pakje|zakjes?|snufje|bosje|handje|plakjes?|cups?|tbsp|tsp|tablespoons?|teaspoons?|oz|lb|pinch)\b",
    )
    .expect("valid regex")
});

static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•·–—▢☐✓✔]+\s*|\d{1,2}[.)]\s+)").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse whitespace and decode entities
pub fn normalize_whitespace(text: &str) -> String {
    let decoded = decode_html_entities(text);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Remove a leading list marker ("- ", "• ", "3. ")
pub fn strip_bullet(text: &str) -> &str {
    match BULLET_PREFIX.find(text) {
        Some(m) => text[m.end()..].trim_start(),
        None => text,
    }
}

/// Normalize a raw fragment; `None` when it cannot be an ingredient line at all
pub fn clean_line(text: &str) -> Option<String> {
    let normalized = normalize_whitespace(text);
    let line = strip_bullet(&normalized).trim().to_string();
    let chars = line.chars().count();

    if !(MIN_LINE_CHARS..=MAX_LINE_CHARS).contains(&chars) {
        return None;
    }
    if line.chars().any(|c| c.is_control()) {
        return None;
    }
    if line.contains('<') || line.contains("http") || line.contains("www.") {
        return None;
    }

    let texty = line
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || ",-().".contains(*c))
        .count();
    if (texty as f64) / (chars as f64) < 0.5 {
        return None;
    }

    Some(line)
}

fn digit_ratio(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    text.chars().filter(|c| c.is_ascii_digit()).count() as f64 / total as f64
}

/// Whether a line mentions a quantity or unit
pub fn has_quantity_hint(text: &str) -> bool {
    QUANTITY_HINT.is_match(text)
}

/// Whether the line is dominated by page-furniture words
pub fn has_skip_word(text: &str) -> bool {
    SKIP_WORDS.is_match(text)
}

/// Heuristic screen for lines pulled from loosely structured markup
pub fn is_likely_ingredient(text: &str) -> bool {
    let chars = text.chars().count();
    if !(MIN_LINE_CHARS..=120).contains(&chars) {
        return false;
    }
    if has_skip_word(text) {
        return false;
    }
    (has_quantity_hint(text) || is_known_ingredient(text)) && digit_ratio(text) < 0.3
}

/// Clean, screen and de-duplicate a candidate group
pub fn screen_lines<I, S>(raw: I, loose: bool) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .filter_map(|text| clean_line(text.as_ref()))
        .filter(|line| !loose || is_likely_ingredient(line))
        .filter(|line| !is_section_header(line))
        .filter(|line| seen.insert(line.to_lowercase()))
        .collect()
}

/// "Ingrediënten", "Voor de saus:" and similar headers
pub fn is_section_header(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    let bare = lowered.trim_end_matches(':').trim();
    matches!(
        bare,
        "ingrediënten" | "ingredienten" | "ingredients" | "benodigdheden" | "nodig"
    ) || (lowered.ends_with(':') && !has_quantity_hint(&lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line_strips_bullets_and_entities() {
        assert_eq!(clean_line("  - 200&nbsp;g   bloem "), Some("200 g bloem".to_string()));
        assert_eq!(clean_line("• 2 uien"), Some("2 uien".to_string()));
        assert_eq!(clean_line("3. 1 blik tomaten"), Some("1 blik tomaten".to_string()));
    }

    #[test]
    fn test_clean_line_rejects_noise() {
        assert_eq!(clean_line("ab"), None);
        assert_eq!(clean_line(&"x".repeat(201)), None);
        assert_eq!(clean_line("zie https://example.com"), None);
        assert_eq!(clean_line("12345 678 90"), None);
    }

    #[test]
    fn test_likely_ingredient() {
        assert!(is_likely_ingredient("200 g bloem"));
        assert!(is_likely_ingredient("snufje zout"));
        assert!(is_likely_ingredient("verse basilicum"));
        assert!(!is_likely_ingredient("Bereidingstijd 30 minuten"));
        assert!(!is_likely_ingredient("Lees alle reviews"));
        assert!(!is_likely_ingredient("Deel dit met vrienden"));
    }

    #[test]
    fn test_screen_lines_dedups_and_drops_headers() {
        let lines = screen_lines(
            ["Ingrediënten", "200 g bloem", "200 g Bloem", "Voor de saus:", "1 ui"],
            false,
        );
        assert_eq!(lines, vec!["200 g bloem".to_string(), "1 ui".to_string()]);
    }
}
