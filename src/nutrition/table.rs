//! Built-in health scores for common ingredients.
//!
//! Lookups match whole words and prefer the longest matching key, so
//! "extra vierge olijfolie" resolves to olijfolie (7) rather than olie (3).

use once_cell::sync::Lazy;
use regex::Regex;

/// (name, score) pairs; Dutch names first, common English names after
const HEALTH_SCORES: &[(&str, u8)] = &[
    // Vegetables
    ("ui", 7),
    ("uien", 7),
    ("uitje", 7),
    ("uitjes", 7),
    ("rode ui", 7),
    ("lente-ui", 8),
    ("tomaat", 8),
    ("tomaten", 8),
    ("cherrytomaten", 8),
    ("paprika", 8),
    ("courgette", 8),
    ("wortel", 9),
    ("wortels", 9),
    ("winterpeen", 9),
    ("aardappel", 6),
    ("aardappelen", 6),
    ("zoete aardappel", 7),
    ("spinazie", 9),
    ("sla", 8),
    ("rucola", 8),
    ("andijvie", 8),
    ("broccoli", 9),
    ("bloemkool", 8),
    ("prei", 7),
    ("asperges", 9),
    ("doperwten", 8),
    ("champignons", 8),
    ("aubergine", 8),
    ("komkommer", 8),
    ("boerenkool", 9),
    ("sperziebonen", 8),
    ("avocado", 8),
    // Herbs and spices
    ("knoflook", 8),
    ("peterselie", 9),
    ("basilicum", 9),
    ("oregano", 8),
    ("tijm", 8),
    ("rozemarijn", 8),
    ("munt", 8),
    ("dille", 8),
    ("koriander", 8),
    ("gember", 8),
    ("kurkuma", 8),
    ("komijn", 8),
    ("kaneel", 7),
    ("chilipeper", 7),
    // Grains and starches
    ("rijst", 5),
    ("zilvervliesrijst", 7),
    ("pasta", 4),
    ("volkoren pasta", 6),
    ("orzo", 4),
    ("couscous", 5),
    ("quinoa", 7),
    ("haver", 6),
    ("havermout", 7),
    ("bloem", 3),
    ("tarwebloem", 3),
    ("volkorenmeel", 6),
    ("brood", 4),
    ("volkorenbrood", 6),
    ("paneermeel", 3),
    // Proteins
    ("vlees", 5),
    ("gehakt", 4),
    ("rundergehakt", 4),
    ("spek", 2),
    ("spekjes", 2),
    ("bacon", 2),
    ("worst", 2),
    ("ham", 3),
    ("kip", 6),
    ("kipfilet", 7),
    ("kalkoen", 7),
    ("vis", 8),
    ("zalm", 8),
    ("tonijn", 7),
    ("kabeljauw", 8),
    ("garnalen", 7),
    ("ei", 6),
    ("eieren", 6),
    ("bonen", 7),
    ("kidneybonen", 7),
    ("kikkererwten", 8),
    ("linzen", 8),
    ("tofu", 7),
    // Dairy
    ("melk", 5),
    ("halfvolle melk", 6),
    ("room", 3),
    ("slagroom", 2),
    ("kookroom", 3),
    ("creme fraiche", 3),
    ("crème fraîche", 3),
    ("boter", 2),
    ("roomboter", 2),
    ("kaas", 4),
    ("geraspte kaas", 4),
    ("parmezaanse kaas", 4),
    ("mozzarella", 5),
    ("yoghurt", 6),
    ("griekse yoghurt", 7),
    ("kwark", 6),
    ("feta", 4),
    ("ricotta", 5),
    ("burrata", 4),
    // Fruits
    ("appel", 8),
    ("banaan", 7),
    ("citroen", 8),
    ("limoen", 8),
    ("nectarine", 8),
    ("nectarines", 8),
    ("perzik", 8),
    ("aardbei", 8),
    ("aardbeien", 8),
    ("blauwe bessen", 9),
    ("sinaasappel", 8),
    ("peer", 8),
    // Fats and oils
    ("olie", 3),
    ("olijfolie", 7),
    ("zonnebloemolie", 3),
    ("margarine", 2),
    ("kokosolie", 3),
    // Condiments and seasonings
    ("suiker", 1),
    ("basterdsuiker", 1),
    ("poedersuiker", 1),
    ("honing", 3),
    ("zout", 2),
    ("peper", 6),
    ("azijn", 6),
    ("wittewijnazijn", 6),
    ("balsamico", 5),
    ("sojasaus", 3),
    ("ketjap", 2),
    ("mayonaise", 2),
    ("ketchup", 2),
    ("bouillon", 3),
    ("bouillonblokje", 2),
    ("chocolade", 3),
    ("pure chocolade", 5),
    // Nuts and seeds
    ("noten", 7),
    ("amandelen", 8),
    ("walnoten", 8),
    ("cashewnoten", 7),
    ("pijnboompitten", 7),
    ("zonnebloempitten", 7),
    ("sesamzaad", 7),
    ("chiazaad", 8),
    // English
    ("onion", 7),
    ("garlic", 8),
    ("tomato", 8),
    ("carrot", 9),
    ("spinach", 9),
    ("potato", 6),
    ("flour", 3),
    ("sugar", 1),
    ("butter", 2),
    ("cream", 3),
    ("cheese", 4),
    ("olive oil", 7),
    ("oil", 3),
    ("salt", 2),
    ("egg", 6),
    ("eggs", 6),
    ("chicken", 6),
    ("salmon", 8),
    ("rice", 5),
];

static TABLE_PATTERNS: Lazy<Vec<(Regex, &'static str, u8)>> = Lazy::new(|| {
    let mut entries: Vec<_> = HEALTH_SCORES
        .iter()
        .filter_map(|(name, score)| {
            Regex::new(&format!(r"(?:^|[^\p{{L}}]){}(?:$|[^\p{{L}}])", regex::escape(name)))
                .ok()
                .map(|re| (re, *name, *score))
        })
        .collect();
    // Longest key first so multi-word and compound names win
    entries.sort_by(|a, b| b.1.chars().count().cmp(&a.1.chars().count()).then(a.1.cmp(b.1)));
    entries
});

/// Known ingredient contained in `name`, with its score
pub fn lookup(name: &str) -> Option<(&'static str, u8)> {
    let lowered = name.to_lowercase();
    TABLE_PATTERNS
        .iter()
        .find(|(re, _, _)| re.is_match(&lowered))
        .map(|(_, key, score)| (*key, *score))
}

/// Whether `key` occurs in `text` as a whole word (or word group)
pub fn contains_word(text: &str, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    text.match_indices(key).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + key.len()..].chars().next();
        !before.is_some_and(char::is_alphabetic) && !after.is_some_and(char::is_alphabetic)
    })
}

/// Entry of `entries` whose key is the longest whole-word match in `name`
pub fn longest_match<'a, T>(entries: &'a [(&'a str, T)], name: &str) -> Option<&'a (&'a str, T)> {
    let lowered = name.to_lowercase();
    entries
        .iter()
        .filter(|(key, _)| contains_word(&lowered, key))
        .max_by_key(|(key, _)| key.chars().count())
}

/// Whether the text mentions any known ingredient
pub fn is_known_ingredient(text: &str) -> bool {
    lookup(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        assert_eq!(lookup("suiker"), Some(("suiker", 1)));
        assert_eq!(lookup("Broccoli"), Some(("broccoli", 9)));
    }

    #[test]
    fn test_longest_key_wins() {
        assert_eq!(lookup("extra vierge olijfolie"), Some(("olijfolie", 7)));
        assert_eq!(lookup("griekse yoghurt"), Some(("griekse yoghurt", 7)));
    }

    #[test]
    fn test_matches_whole_words_only() {
        // "ui" must not match inside "fruit" or "kruiden"
        assert_eq!(lookup("gemengde kruiden"), None);
        assert_eq!(lookup("2 rode uien"), Some(("uien", 7)));
    }

    #[test]
    fn test_longest_match() {
        let entries = [("room", 1), ("zure room", 2)];
        assert_eq!(longest_match(&entries, "Zure room").map(|e| e.1), Some(2));
        assert_eq!(longest_match(&entries, "slagroom"), None);
        assert!(contains_word("2 rode uien", "uien"));
        assert!(!contains_word("kruiden", "ui"));
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(lookup("xanthaangom"), None);
        assert!(!is_known_ingredient("xanthaangom"));
    }
}
