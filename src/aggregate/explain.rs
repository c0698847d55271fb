use crate::model::{HealthClass, HealthLevel, ScoredIngredient};

/// Share of low scorers (≤4) above which the recipe counts as processed-heavy
const PROCESSED_SHARE: f64 = 0.5;
/// Share of high scorers (≥7) above which the recipe counts as natural-rich
const NATURAL_SHARE: f64 = 0.6;

fn bucket_line(prefix: &str, label: &str, range: &str, names: &[&str]) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    Some(format!("{prefix} {label} (score {range}): {}", names.join(", ")))
}

fn rationale(composite: f64, weighted: bool) -> String {
    let verdict = match HealthLevel::from_score(composite) {
        HealthLevel::Excellent => "dit recept is een uitstekende keuze",
        HealthLevel::Good => "een goede keuze met ruimte voor kleine verbeteringen",
        HealthLevel::Fair => "redelijk, een paar vervangingen maken veel verschil",
        HealthLevel::Poor => "dit recept bevat veel minder gezonde ingrediënten",
    };
    let basis = if weighted {
        "Ingrediënten tellen zwaarder mee naarmate ze een groter deel van het gewicht vormen."
    } else {
        "Alle ingrediënten tellen even zwaar mee."
    };
    format!("📊 Totaalscore {composite:.1}/10: {verdict}. {basis}")
}

/// Dutch summary lines for the analysis response
pub fn explain(ingredients: &[ScoredIngredient], composite: f64, weighted: bool) -> Vec<String> {
    let names_in = |class: HealthClass| -> Vec<&str> {
        ingredients
            .iter()
            .filter(|i| i.health_class == class)
            .map(ScoredIngredient::name)
            .collect()
    };

    let mut lines: Vec<String> = [
        bucket_line("✅", "Gezonde ingrediënten", "7-10", &names_in(HealthClass::Healthy)),
        bucket_line("⚠️", "Neutrale ingrediënten", "4-6", &names_in(HealthClass::Neutral)),
        bucket_line(
            "❌",
            "Minder gezonde ingrediënten",
            "0-3",
            &names_in(HealthClass::Unhealthy),
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !ingredients.is_empty() {
        let total = ingredients.len() as f64;
        let low = ingredients.iter().filter(|i| i.health_score <= 4).count() as f64;
        let high = ingredients.iter().filter(|i| i.health_score >= 7).count() as f64;

        if low / total > PROCESSED_SHARE {
            lines.push(
                "🔍 Dit recept bevat veel bewerkte ingrediënten. Overweeg verse alternatieven."
                    .to_string(),
            );
        }
        if high / total > NATURAL_SHARE {
            lines.push(
                "🌱 Excellent! Dit recept is rijk aan natuurlijke, onbewerkte ingrediënten."
                    .to_string(),
            );
        }
    }

    lines.push(rationale(composite, weighted));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParsedIngredient;

    fn scored(name: &str, score: u8) -> ScoredIngredient {
        ScoredIngredient {
            ingredient: ParsedIngredient {
                name: name.to_string(),
                quantity: None,
                unit: None,
                original_text: name.to_string(),
            },
            health_score: score,
            health_class: HealthClass::from_score(score),
            health_fact: None,
            substitution: None,
            nutrition: None,
        }
    }

    #[test]
    fn test_bucket_lines_list_names() {
        let lines = explain(
            &[scored("broccoli", 9), scored("kip", 6), scored("suiker", 1)],
            5.3,
            false,
        );
        assert_eq!(lines[0], "✅ Gezonde ingrediënten (score 7-10): broccoli");
        assert_eq!(lines[1], "⚠️ Neutrale ingrediënten (score 4-6): kip");
        assert_eq!(lines[2], "❌ Minder gezonde ingrediënten (score 0-3): suiker");
        assert!(lines.last().unwrap().starts_with("📊 Totaalscore 5.3/10"));
    }

    #[test]
    fn test_empty_buckets_are_skipped() {
        let lines = explain(&[scored("kip", 6)], 6.0, true);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("gewicht"));
    }

    #[test]
    fn test_processed_warning() {
        let lines = explain(
            &[scored("suiker", 1), scored("spek", 3), scored("ui", 8)],
            3.0,
            false,
        );
        assert!(lines.iter().any(|l| l.starts_with("🔍")));
        assert!(!lines.iter().any(|l| l.starts_with("🌱")));
    }

    #[test]
    fn test_natural_compliment() {
        let lines = explain(
            &[scored("broccoli", 9), scored("ui", 8), scored("zout", 2)],
            7.0,
            false,
        );
        assert!(lines.iter().any(|l| l.starts_with("🌱")));
    }
}
