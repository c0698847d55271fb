//! Splits a raw ingredient line into quantity, unit and a lookup name.
//!
//! Parsing never fails: anything that cannot be understood stays in the name
//! and leaves quantity and unit empty. Numbers use Dutch notation, so
//! "1,5" is one and a half and "1.000" is a thousand.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ParsedIngredient;

/// Spelling variants mapped to the canonical unit
const UNIT_ALIASES: &[(&str, &str)] = &[
    ("g", "g"),
    ("gr", "g"),
    ("gram", "g"),
    ("grams", "g"),
    ("kg", "kg"),
    ("kilo", "kg"),
    ("kilogram", "kg"),
    ("mg", "mg"),
    ("milligram", "mg"),
    ("ml", "ml"),
    ("milliliter", "ml"),
    ("cl", "cl"),
    ("centiliter", "cl"),
    ("dl", "dl"),
    ("deciliter", "dl"),
    ("l", "l"),
    ("liter", "l"),
    ("el", "el"),
    ("eetlepel", "el"),
    ("eetlepels", "el"),
    ("tbsp", "el"),
    ("tablespoon", "el"),
    ("tablespoons", "el"),
    ("tl", "tl"),
    ("theelepel", "tl"),
    ("theelepels", "tl"),
    ("tsp", "tl"),
    ("teaspoon", "tl"),
    ("teaspoons", "tl"),
    ("kopje", "kopje"),
    ("kopjes", "kopje"),
    ("cup", "kopje"),
    ("cups", "kopje"),
    ("st", "stuks"),
    ("stuk", "stuks"),
    ("stuks", "stuks"),
    ("teen", "teen"),
    ("tenen", "teen"),
    ("teentje", "teen"),
    ("teentjes", "teen"),
    ("clove", "teen"),
    ("cloves", "teen"),
    ("blik", "blik"),
    ("blikje", "blik"),
    ("blikjes", "blik"),
    ("blikken", "blik"),
    ("can", "blik"),
    ("pak", "pak"),
    ("pakje", "pak"),
    ("pakjes", "pak"),
    ("pakken", "pak"),
    ("zak", "zakje"),
    ("zakje", "zakje"),
    ("zakjes", "zakje"),
    ("snuf", "snuf"),
    ("snufje", "snuf"),
    ("snufjes", "snuf"),
    ("pinch", "snuf"),
    ("bos", "bos"),
    ("bosje", "bos"),
    ("bosjes", "bos"),
    ("bunch", "bos"),
    ("plak", "plak"),
    ("plakje", "plak"),
    ("plakjes", "plak"),
    ("plakken", "plak"),
    ("slice", "plak"),
    ("slices", "plak"),
    ("oz", "oz"),
    ("ounce", "oz"),
    ("ounces", "oz"),
    ("lb", "lb"),
    ("lbs", "lb"),
    ("pound", "lb"),
    ("pounds", "lb"),
];

/// Approximate grams per canonical unit
const UNIT_GRAMS: &[(&str, f64)] = &[
    ("g", 1.0),
    ("kg", 1000.0),
    ("mg", 0.001),
    ("ml", 1.0),
    ("cl", 10.0),
    ("dl", 100.0),
    ("l", 1000.0),
    ("el", 15.0),
    ("tl", 5.0),
    ("kopje", 240.0),
    ("stuks", 100.0),
    ("teen", 5.0),
    ("blik", 400.0),
    ("pak", 500.0),
    ("zakje", 100.0),
    ("snuf", 0.5),
    ("bos", 50.0),
    ("plak", 20.0),
    ("oz", 28.35),
    ("lb", 453.6),
];

/// Unit used when a count has no explicit unit ("2 uien")
pub const COUNT_UNIT: &str = "stuks";

/// Measure words that appear without a number ("snufje zout", "handje rucola")
const LOOSE_MEASURES: &[&str] = &[
    "snufje", "snuf", "handje", "handjevol", "scheutje", "beetje", "klontje", "takje", "takjes",
    "blikje", "bosje", "plukje", "wat", "pinch", "dash", "some",
];

static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<qty>\d+\s+\d+\s*/\s*\d+|\d+\s*/\s*\d+|\d+(?:[.,]\d+)?\s*(?:-|–|tot)\s*\d+(?:[.,]\d+)?|\d*\s*[½¼¾⅓⅔⅛]|\d+(?:[.,]\d+)?)\s*(?P<rest>.*)$",
    )
    .expect("valid regex")
});

static UNIT_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<unit>[a-z]+)\.?(?:\s+(?P<name>.*))?$").expect("valid regex"));

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid regex"));

/// Preparation notes that trail the ingredient name
static DESCRIPTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\s+(fijngehakt|fijngesneden|grof gehakt|in blokjes|in reepjes|in plakjes|in ringen|in stukjes|in partjes|gesneden|geraspt|geschild|uitgelekt|ontdooid|zonder zaadjes|naar smaak|optioneel|chopped|diced|sliced|minced|grated|peeled|drained|to taste)\b.*$",
    )
    .expect("valid regex")
});

/// "1.000" or "12.500": dots grouping thousands
static THOUSANDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9]\d{0,2}(?:\.\d{3})+$").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Canonical form of a unit spelling, if it is a known unit
pub fn canonical_unit(word: &str) -> Option<&'static str> {
    let word = word.to_lowercase();
    UNIT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == word)
        .map(|(_, unit)| *unit)
}

/// Approximate grams for one canonical unit
pub fn unit_grams(unit: &str) -> Option<f64> {
    UNIT_GRAMS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, grams)| *grams)
}

/// Estimated mass of a parsed line
pub fn grams(ingredient: &ParsedIngredient) -> Option<f64> {
    let quantity = ingredient.quantity?;
    let per_unit = unit_grams(ingredient.unit.as_deref()?)?;
    Some(quantity * per_unit)
}

fn vulgar_fraction(c: char) -> Option<f64> {
    match c {
        '½' => Some(0.5),
        '¼' => Some(0.25),
        '¾' => Some(0.75),
        '⅓' => Some(1.0 / 3.0),
        '⅔' => Some(2.0 / 3.0),
        '⅛' => Some(0.125),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if THOUSANDS.is_match(text) {
        return text.replace('.', "").parse().ok();
    }
    text.replace(',', ".").parse().ok()
}

fn parse_fraction(text: &str) -> Option<f64> {
    let (numerator, denominator) = text.split_once('/')?;
    let denominator = parse_number(denominator)?;
    if denominator == 0.0 {
        return None;
    }
    Some(parse_number(numerator)? / denominator)
}

/// Numeric value of a matched quantity token
fn quantity_value(token: &str) -> Option<f64> {
    let token = token.trim();

    if let Some(fraction) = token.chars().last().and_then(vulgar_fraction) {
        let whole = token.trim_end_matches(|c: char| vulgar_fraction(c).is_some());
        let whole = if whole.trim().is_empty() {
            0.0
        } else {
            parse_number(whole)?
        };
        return Some(whole + fraction);
    }

    if token.contains('/') {
        return match token.split_once(char::is_whitespace) {
            Some((whole, fraction)) => Some(parse_number(whole)? + parse_fraction(fraction.trim())?),
            None => parse_fraction(token),
        };
    }

    for separator in ["tot", "–", "-"] {
        if let Some((low, high)) = token.split_once(separator) {
            return Some((parse_number(low)? + parse_number(high)?) / 2.0);
        }
    }

    parse_number(token)
}

/// Text glued to a number ("300g gehakt") must start with a unit word,
/// otherwise the number is part of something else ("1e10")
fn glued_unit(rest: &str) -> bool {
    let word_end = rest.find(|c: char| !c.is_alphabetic()).unwrap_or(rest.len());
    if word_end == 0 {
        return true;
    }
    let continues = rest[word_end..].chars().next().is_some_and(char::is_alphanumeric);
    !continues && canonical_unit(&rest[..word_end]).is_some()
}

/// "een", "half", "een kwart" and friends
fn word_quantity(text: &str) -> Option<(f64, &str)> {
    let (first, rest) = text.split_once(' ')?;
    let rest = rest.trim_start();
    match first {
        "half" | "halve" => Some((0.5, rest)),
        "kwart" => Some((0.25, rest)),
        "een" | "één" | "a" | "an" => match rest.split_once(' ') {
            Some(("half" | "halve", tail)) => Some((0.5, tail)),
            Some(("kwart", tail)) => Some((0.25, tail)),
            _ => Some((1.0, rest)),
        },
        _ => None,
    }
}

/// Split a unit off the text following a quantity; a lone unit ("2 el")
/// leaves an empty name
fn split_unit(rest: &str) -> (&'static str, String) {
    if let Some(caps) = UNIT_WORD.captures(rest) {
        let name = caps.name("name").map_or("", |m| m.as_str()).trim();
        if let Some(unit) = caps.name("unit").and_then(|m| canonical_unit(m.as_str())) {
            return (unit, name.to_string());
        }
    }
    // "300 gram gehakt" handled above; everything else is a count
    let rest = rest.trim();
    (COUNT_UNIT, rest.to_string())
}

fn strip_loose_measure(name: &str) -> &str {
    let mut name = name.trim();
    loop {
        let Some((first, rest)) = name.split_once(' ') else {
            return name;
        };
        if LOOSE_MEASURES.contains(&first) {
            name = rest.trim_start();
        } else {
            return name;
        }
    }
}

/// Lowercased name without notes, descriptors or leading filler words
pub fn canonical_name(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_notes = PARENTHETICAL.replace_all(&lowered, " ");
    let head = without_notes.split(',').next().unwrap_or_default();
    let collapsed = WHITESPACE.replace_all(head.trim(), " ").into_owned();
    let trimmed = DESCRIPTOR.replace(&collapsed, "").into_owned();

    let name = strip_loose_measure(&trimmed);
    let name = name
        .strip_prefix("of ")
        .or_else(|| name.strip_prefix("van "))
        .unwrap_or(name);

    name.trim_matches(|c: char| !c.is_alphanumeric()).to_string()
}

fn normalise(raw: &str) -> String {
    WHITESPACE.replace_all(&raw.trim().to_lowercase(), " ").into_owned()
}

/// Parse one raw ingredient line, `None` when it names no ingredient
/// ("2 el", "1 (optioneel)")
pub fn parse_line(raw: &str) -> Option<ParsedIngredient> {
    let lowered = normalise(raw);

    let measured = QUANTITY
        .captures(&lowered)
        .and_then(|caps| {
            let qty = caps.name("qty")?;
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            let glued = qty.as_str().ends_with(|c: char| c.is_ascii_digit())
                && !lowered[qty.end()..].starts_with(char::is_whitespace);
            if glued && !glued_unit(rest) {
                return None;
            }
            Some((quantity_value(qty.as_str())?, rest.to_string()))
        })
        .or_else(|| word_quantity(&lowered).map(|(value, rest)| (value, rest.to_string())));

    let (quantity, unit, name) = match measured {
        Some((value, rest)) => {
            let (unit, name) = split_unit(&rest);
            (Some(value), Some(unit.to_string()), canonical_name(&name))
        }
        None => (None, None, canonical_name(&lowered)),
    };
    if name.is_empty() {
        return None;
    }

    Some(ParsedIngredient {
        name,
        quantity,
        unit,
        original_text: raw.trim().to_string(),
    })
}

/// Parse one raw ingredient line; lines without an ingredient keep their
/// whole text as the name
pub fn parse(raw: &str) -> ParsedIngredient {
    parse_line(raw).unwrap_or_else(|| ParsedIngredient {
        name: normalise(raw),
        quantity: None,
        unit: None,
        original_text: raw.trim().to_string(),
    })
}
