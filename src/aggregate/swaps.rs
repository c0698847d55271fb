use serde::Serialize;

use crate::nutrition::table::longest_match;

/// A healthier replacement and why it helps
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Substitution {
    pub suggestion: &'static str,
    pub reason: &'static str,
}

const fn sub(suggestion: &'static str, reason: &'static str) -> Substitution {
    Substitution { suggestion, reason }
}

const SUBSTITUTIONS: &[(&str, Substitution)] = &[
    ("room", sub("halfvolle kookroom of Griekse yoghurt", "Minder verzadigd vet en minder calorieën")),
    ("slagroom", sub("Griekse yoghurt", "Veel minder verzadigd vet, meer eiwit")),
    ("kookroom", sub("light kookroom of kwark", "Minder verzadigd vet")),
    ("creme fraiche", sub("magere yoghurt", "Minder verzadigd vet")),
    ("crème fraîche", sub("magere yoghurt", "Minder verzadigd vet")),
    ("boter", sub("olijfolie", "Onverzadigde vetten in plaats van verzadigde vetten")),
    ("roomboter", sub("olijfolie", "Onverzadigde vetten in plaats van verzadigde vetten")),
    ("margarine", sub("olijfolie", "Minder bewerkt, gezondere vetten")),
    ("zonnebloemolie", sub("olijfolie", "Meer enkelvoudig onverzadigde vetten en antioxidanten")),
    ("olie", sub("olijfolie", "Meer enkelvoudig onverzadigde vetten en antioxidanten")),
    ("kokosolie", sub("olijfolie", "Veel minder verzadigd vet")),
    ("suiker", sub("honing of dadels (met mate)", "Minder geraffineerd en minder bloedsuikerpieken")),
    ("basterdsuiker", sub("kokosbloesemsuiker (met mate)", "Minder geraffineerd")),
    ("poedersuiker", sub("fruitpuree", "Natuurlijke zoetheid met vezels")),
    ("zout", sub("verse kruiden of citroensap", "Minder natrium, goed voor de bloeddruk")),
    ("bloem", sub("volkorenmeel", "Meer vezels en voedingsstoffen")),
    ("tarwebloem", sub("volkorenmeel", "Meer vezels en voedingsstoffen")),
    ("pasta", sub("volkoren pasta", "Meer vezels, langer een verzadigd gevoel")),
    ("orzo", sub("volkoren orzo of parelgort", "Meer vezels")),
    ("rijst", sub("zilvervliesrijst", "Meer vezels en B-vitamines")),
    ("witte rijst", sub("zilvervliesrijst", "Meer vezels en B-vitamines")),
    ("couscous", sub("volkoren couscous of quinoa", "Meer vezels en eiwit")),
    ("brood", sub("volkorenbrood", "Meer vezels en mineralen")),
    ("paneermeel", sub("gemalen havermout", "Meer vezels, minder bewerkt")),
    ("gehakt", sub("kipgehakt of linzen", "Minder verzadigd vet")),
    ("rundergehakt", sub("kipgehakt of linzen", "Minder verzadigd vet")),
    ("spek", sub("kipfilet of gerookte tofu", "Minder verzadigd vet en zout")),
    ("spekjes", sub("kipfiletblokjes of gerookte tofu", "Minder verzadigd vet en zout")),
    ("bacon", sub("kalkoenfilet", "Minder verzadigd vet en zout")),
    ("worst", sub("kipfilet", "Minder bewerkt vlees en zout")),
    ("ham", sub("kipfilet", "Minder zout en bewerkingen")),
    ("kaas", sub("30+ kaas", "Minder verzadigd vet")),
    ("geraspte kaas", sub("een kleinere portie oude kaas", "Meer smaak met minder vet")),
    ("mayonaise", sub("yoghurtdressing", "Veel minder vet en calorieën")),
    ("ketchup", sub("tomatenpuree met kruiden", "Geen toegevoegde suiker")),
    ("ketjap", sub("sojasaus met minder zout", "Minder suiker en zout")),
    ("sojasaus", sub("sojasaus met minder zout", "Minder natrium")),
    ("bouillonblokje", sub("zelfgemaakte groentebouillon", "Veel minder zout")),
    ("bouillon", sub("zoutarme bouillon", "Minder natrium")),
    ("chocolade", sub("pure chocolade (70%+)", "Meer antioxidanten, minder suiker")),
    ("burrata", sub("mozzarella light", "Minder verzadigd vet")),
    ("feta", sub("light feta", "Minder zout en vet")),
    ("sugar", sub("honey (in moderation)", "Less refined sugar")),
    ("butter", sub("olive oil", "Unsaturated instead of saturated fat")),
    ("cream", sub("Greek yoghurt", "Less saturated fat")),
    ("flour", sub("whole wheat flour", "More fibre")),
    ("salt", sub("fresh herbs", "Less sodium")),
];

/// Healthier alternative for an ingredient name, if one is known
pub fn find_substitution(name: &str) -> Option<Substitution> {
    longest_match(SUBSTITUTIONS, name).map(|(_, substitution)| *substitution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::nutrition::table;

    #[test]
    fn test_finds_specific_substitution() {
        assert_eq!(
            find_substitution("slagroom").map(|s| s.suggestion),
            Some("Griekse yoghurt")
        );
        assert_eq!(find_substitution("zonnebloemolie").map(|s| s.suggestion), Some("olijfolie"));
        assert_eq!(find_substitution("witte rijst").map(|s| s.suggestion), Some("zilvervliesrijst"));
    }

    #[test]
    fn test_no_substitution_for_healthy_or_unknown() {
        assert!(find_substitution("broccoli").is_none());
        assert!(find_substitution("olijfolie").is_none());
    }

    #[test]
    fn test_every_substitution_can_fire() {
        let threshold = ScoringConfig::default().swap_threshold;
        for (name, _) in SUBSTITUTIONS {
            if let Some((_, score)) = table::lookup(name) {
                assert!(score < threshold, "{name} scores {score}, never below {threshold}");
            }
        }
    }
}
