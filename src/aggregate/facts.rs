//! Short Dutch health notes shown next to ingredients.

use crate::nutrition::table::{contains_word, longest_match};

const HEALTH_FACTS: &[(&str, &str)] = &[
    ("tomaat", "Tomaten zijn rijk aan lycopeen, een antioxidant die cellen beschermt en het risico op hartziekten kan verlagen."),
    ("tomaten", "Tomaten zijn rijk aan lycopeen, een antioxidant die cellen beschermt en het risico op hartziekten kan verlagen."),
    ("ui", "Uien bevatten quercetine, een flavonoïde die ontstekingen vermindert en het immuunsysteem versterkt."),
    ("uien", "Uien bevatten quercetine, een flavonoïde die ontstekingen vermindert en het immuunsysteem versterkt."),
    ("knoflook", "Knoflook bevat allicine, dat helpt bij het verlagen van bloeddruk en cholesterol."),
    ("spinazie", "Spinazie is rijk aan ijzer, foliumzuur en vitamine K voor sterke botten."),
    ("wortel", "Wortelen bevatten bètacaroteen, dat het lichaam omzet in vitamine A voor zicht en weerstand."),
    ("wortels", "Wortelen bevatten bètacaroteen, dat het lichaam omzet in vitamine A voor zicht en weerstand."),
    ("paprika", "Paprika's bevatten meer vitamine C dan sinaasappels, belangrijk voor weerstand en ijzeropname."),
    ("courgette", "Courgettes zijn laag in calorieën en rijk aan kalium, dat de bloeddruk reguleert."),
    ("broccoli", "Broccoli bevat sulforafaan, dat de lever ondersteunt bij het ontgiften."),
    ("avocado", "Avocado's bevatten enkelvoudig onverzadigde vetten die het LDL-cholesterol verlagen."),
    ("noten", "Noten zijn rijk aan onverzadigde vetten die het hart beschermen en de hersenfunctie ondersteunen."),
    ("vis", "Vette vis bevat omega-3 vetzuren (EPA en DHA) voor hersenen, geheugen en minder ontstekingen."),
    ("zalm", "Zalm bevat omega-3 vetzuren (EPA en DHA) voor hersenen, geheugen en minder ontstekingen."),
    ("yoghurt", "Yoghurt bevat probiotica die de darmgezondheid en de weerstand bevorderen."),
    ("peterselie", "Peterselie is rijk aan vitamine K, vitamine C en foliumzuur."),
    ("asperges", "Asperges bevatten foliumzuur voor de aanmaak van rode bloedcellen, plus vezels voor de spijsvertering."),
    ("nectarine", "Nectarines bevatten vitamine C en vezels, en antioxidanten die cellen beschermen."),
    ("nectarines", "Nectarines bevatten vitamine C en vezels, en antioxidanten die cellen beschermen."),
    ("olijfolie", "Extra vierge olijfolie bevat gezonde vetten en antioxidanten die het hart beschermen."),
    ("linzen", "Linzen leveren plantaardig eiwit en veel vezels, goed voor een stabiele bloedsuiker."),
    ("suiker", "Toegevoegde suiker levert lege calorieën en zorgt voor bloedsuikerpieken."),
    ("zout", "Te veel zout verhoogt de bloeddruk; de meeste mensen krijgen er al te veel van binnen."),
    ("boter", "Boter bevat veel verzadigd vet, dat het LDL-cholesterol kan verhogen."),
    ("room", "Room bevat veel verzadigd vet en calorieën."),
];

/// (category members, note) for ingredients without their own note
const CATEGORY_FACTS: &[(&[&str], &str)] = &[
    (
        &["sla", "andijvie", "rucola", "boerenkool"],
        "Groene bladgroenten zijn rijk aan foliumzuur en ijzer, essentieel voor energie.",
    ),
    (
        &["appel", "peer", "aardbei", "aardbeien", "banaan", "sinaasappel"],
        "Fruit bevat vezels die cholesterol verlagen, plus antioxidanten die cellen beschermen.",
    ),
    (
        &["vlees", "gehakt", "kip", "kipfilet", "kalkoen"],
        "Vlees levert hoogwaardige eiwitten voor spieropbouw en vitamine B12 voor de zenuwen.",
    ),
    (
        &["basilicum", "tijm", "oregano", "rozemarijn", "munt", "dille", "koriander"],
        "Verse kruiden bevatten veel antioxidanten en hebben ontstekingsremmende eigenschappen.",
    ),
];

/// Health note for an ingredient, if one is known
pub fn health_fact(name: &str) -> Option<&'static str> {
    if let Some((_, fact)) = longest_match(HEALTH_FACTS, name) {
        return Some(*fact);
    }
    let lowered = name.to_lowercase();
    CATEGORY_FACTS
        .iter()
        .find(|(members, _)| members.iter().any(|member| contains_word(&lowered, member)))
        .map(|(_, fact)| *fact)
}

/// Description for the ingredient detail popup
pub fn describe(name: &str, healthy: bool) -> String {
    match health_fact(name) {
        Some(fact) => fact.to_string(),
        None if healthy => format!(
            "{name} past goed in een gevarieerd eetpatroon en levert waardevolle voedingsstoffen."
        ),
        None => format!(
            "{name} kun je het beste met mate gebruiken; kijk of er een gezonder alternatief is."
        ),
    }
}
