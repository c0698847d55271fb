//! Ingredient lines from pasted recipe text.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::filters::{clean_line, has_quantity_hint, has_skip_word, strip_bullet};
use crate::error::ExtractionError;
use crate::model::{ExtractedRecipe, RawIngredientLine};
use crate::nutrition::table::is_known_ingredient;

pub const DEFAULT_TEXT_TITLE: &str = "Eigen recept";

const SOURCE: &str = "text";

static INGREDIENT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(ingrediënten|ingredienten|ingredients|benodigdheden|wat heb je nodig)\b")
        .expect("valid regex")
});

static INSTRUCTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(bereiding|bereidingswijze|werkwijze|instructies|instructions|method|directions|preparation)\b",
    )
    .expect("valid regex")
});

/// Sentences that start with a cooking verb read as steps, not ingredients
static COOKING_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(stap \d+|verhit|verwarm|bak|snijd|snij|kook|roer|meng|voeg|serveer|laat|doe|giet|schep|rasp|preheat|heat|bake|stir|mix|add|serve|cook|chop|pour)\b",
    )
    .expect("valid regex")
});

/// Bullet characters that may also appear mid-line between ingredients
const INLINE_BULLETS: &[char] = &['•', '·'];

/// Dash or star bullets written inline: "2 uien - 300 g gehakt"
static INLINE_DASH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[-*–]\s+").expect("valid regex"));

/// List separators; a comma needs trailing space so "1,5 kg" stays whole
static LIST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*;\s*|,\s+").expect("valid regex"));

static QUANTITY_LED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\d|[½¼¾⅓⅔⅛]|(?:een|half|halve|kwart|snufje|scheutje|handje)\b)")
        .expect("valid regex")
});

/// Split `piece` on `separator` only when every part starts with a quantity
fn split_quantity_led<'a>(piece: &'a str, separator: &Regex) -> Option<Vec<&'a str>> {
    let parts: Vec<&str> = separator
        .split(piece)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    (parts.len() > 1 && parts.iter().all(|part| QUANTITY_LED.is_match(part))).then_some(parts)
}

/// Pieces of one pasted line that lists several ingredients
fn split_inline(line: &str) -> Vec<&str> {
    line.split(INLINE_BULLETS)
        .map(|piece| strip_bullet(piece.trim()))
        .filter(|piece| !piece.is_empty())
        .flat_map(|piece| {
            split_quantity_led(piece, &INLINE_DASH)
                .or_else(|| split_quantity_led(piece, &LIST_SEPARATOR))
                .unwrap_or_else(|| vec![piece])
        })
        .collect()
}

#[derive(Debug, PartialEq)]
enum LineKind {
    IngredientHeader,
    InstructionHeader,
    OtherHeader,
    Content,
}

fn classify(line: &str) -> LineKind {
    let bare = line.trim().trim_end_matches(':').trim();
    let short = bare.split_whitespace().count() <= 4;
    if short && INGREDIENT_HEADER.is_match(bare) {
        LineKind::IngredientHeader
    } else if short && INSTRUCTION_HEADER.is_match(bare) {
        LineKind::InstructionHeader
    } else if line.trim_end().ends_with(':') && !has_quantity_hint(line) {
        LineKind::OtherHeader
    } else {
        LineKind::Content
    }
}

fn is_instruction(line: &str) -> bool {
    let words = line.split_whitespace().count();
    (COOKING_VERB.is_match(line) && words > 3)
        || (words > 12 && line.ends_with('.'))
        || line.chars().count() > 150
}

/// A first line that is not a list item, has no numbers and is not itself
/// an obvious ingredient is taken as the title.
fn looks_like_title(line: &str) -> bool {
    let trimmed = line.trim();
    strip_bullet(trimmed) == trimmed
        && !trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed.chars().count() <= 100
        && classify(trimmed) == LineKind::Content
        && !(is_known_ingredient(trimmed) && trimmed.split_whitespace().count() <= 2)
        && !has_skip_word(trimmed)
}

/// Split pasted text into a title and candidate ingredient lines
pub fn extract_text(text: &str, max_lines: usize) -> Result<ExtractedRecipe, ExtractionError> {
    let raw: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let (title, body) = match raw.split_first() {
        Some((first, rest)) if !rest.is_empty() && looks_like_title(first) => {
            (first.to_string(), rest)
        }
        _ => (DEFAULT_TEXT_TITLE.to_string(), raw.as_slice()),
    };

    let mut capturing = true;
    let mut seen = std::collections::HashSet::new();
    let mut lines = Vec::new();

    for line in body {
        match classify(line) {
            LineKind::IngredientHeader => capturing = true,
            LineKind::InstructionHeader => capturing = false,
            LineKind::OtherHeader => {}
            LineKind::Content if capturing => {
                for piece in split_inline(line) {
                    let Some(cleaned) = clean_line(piece) else {
                        continue;
                    };
                    if is_instruction(&cleaned) {
                        debug!("Skipping instruction line: {cleaned}");
                        continue;
                    }
                    if seen.insert(cleaned.to_lowercase()) {
                        lines.push(RawIngredientLine {
                            text: cleaned,
                            source: SOURCE.to_string(),
                            position: lines.len(),
                        });
                    }
                }
            }
            LineKind::Content => {}
        }
        if lines.len() >= max_lines {
            lines.truncate(max_lines);
            break;
        }
    }

    if lines.is_empty() {
        return Err(ExtractionError::NoIngredientsFound);
    }

    Ok(ExtractedRecipe { title, lines })
}
