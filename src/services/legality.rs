//! Règles de légalité : identité couleur, banlists, tailles de deck.
//! Pure, data-driven logic — no I/O.

use crate::models::{Card, Deck, DeckFormat};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Static banlists per format. Deliberately small snapshots, matched
/// case-insensitively by exact name.
const BANNED_COMMANDER: &[&str] = &[
    "Ancestral Recall",
    "Black Lotus",
    "Biorhythm",
    "Coalition Victory",
    "Emrakul, the Aeons Torn",
    "Griselbrand",
    "Iona, Shield of Emeria",
    "Leovold, Emissary of Trest",
    "Paradox Engine",
    "Primeval Titan",
    "Prophet of Kruphix",
    "Sundering Titan",
    "Time Walk",
    "Tinker",
    "Upheaval",
];

const BANNED_DUEL_COMMANDER: &[&str] = &[
    "Ancestral Recall",
    "Black Lotus",
    "Demonic Tutor",
    "Mana Crypt",
    "Sol Ring",
    "Time Walk",
    "Vampiric Tutor",
];

const BANNED_STANDARD: &[&str] = &[
    "Fires of Invention",
    "Oko, Thief of Crowns",
    "Omnath, Locus of Creation",
    "Once Upon a Time",
];

const BANNED_PIONEER: &[&str] = &[
    "Felidar Guardian",
    "Nexus of Fate",
    "Oko, Thief of Crowns",
    "Uro, Titan of Nature's Wrath",
];

const BANNED_MODERN: &[&str] = &[
    "Birthing Pod",
    "Hogaak, Arisen Necropolis",
    "Mox Opal",
    "Oko, Thief of Crowns",
    "Once Upon a Time",
    "Splinter Twin",
];

const BANNED_LEGACY: &[&str] = &[
    "Ancestral Recall",
    "Black Lotus",
    "Demonic Tutor",
    "Time Walk",
    "Tinker",
];

const BANNED_VINTAGE: &[&str] = &["Chaos Orb", "Falling Star", "Shahrazad"];

const BANNED_PAUPER: &[&str] = &["Daze", "Gitaxian Probe", "Gush", "Monastery Swiftspear"];

/// Basic lands escape the copy limits in every format.
const BASIC_LANDS: &[&str] = &[
    "Plains",
    "Island",
    "Swamp",
    "Mountain",
    "Forest",
    "Wastes",
    "Snow-Covered Plains",
    "Snow-Covered Island",
    "Snow-Covered Swamp",
    "Snow-Covered Mountain",
    "Snow-Covered Forest",
    "Snow-Covered Wastes",
];

fn banlist(format: DeckFormat) -> &'static [&'static str] {
    match format {
        DeckFormat::Commander => BANNED_COMMANDER,
        DeckFormat::DuelCommander => BANNED_DUEL_COMMANDER,
        DeckFormat::Standard => BANNED_STANDARD,
        DeckFormat::Pioneer => BANNED_PIONEER,
        DeckFormat::Modern => BANNED_MODERN,
        DeckFormat::Legacy => BANNED_LEGACY,
        DeckFormat::Vintage => BANNED_VINTAGE,
        DeckFormat::Pauper => BANNED_PAUPER,
    }
}

/// Case-insensitive lookup in the format's banlist.
pub fn is_banned(card_name: &str, format: DeckFormat) -> bool {
    let lower = card_name.to_lowercase();
    banlist(format).iter().any(|b| b.to_lowercase() == lower)
}

pub fn is_basic_land(card_name: &str) -> bool {
    let lower = card_name.to_lowercase();
    BASIC_LANDS.iter().any(|b| b.to_lowercase() == lower)
}

/// Color identity of a card: the `color_identity` field when present,
/// otherwise the union of the colors of every face (double-faced cards).
pub fn card_color_identity(card: &Card) -> HashSet<String> {
    if !card.color_identity.is_empty() {
        return card.color_identity.iter().cloned().collect();
    }

    let mut colors: HashSet<String> = card.colors.iter().flatten().cloned().collect();
    if let Some(faces) = &card.card_faces {
        for face in faces {
            colors.extend(face.colors.iter().flatten().cloned());
        }
    }
    colors
}

/// True iff every color of the card appears in the commander's identity.
pub fn is_color_compatible(card: &Card, commander_identity: &[String]) -> bool {
    let identity: HashSet<&str> = commander_identity.iter().map(String::as_str).collect();
    card_color_identity(card).iter().all(|c| identity.contains(c.as_str()))
}

/// Seules les créatures légendaires peuvent être commandant.
pub fn commander_eligible(card: &Card) -> bool {
    let type_line = card
        .type_line
        .as_deref()
        .or_else(|| {
            card.card_faces
                .as_ref()
                .and_then(|faces| faces.first())
                .and_then(|f| f.type_line.as_deref())
        })
        .unwrap_or("");

    type_line.contains("Legendary") && type_line.contains("Creature")
}

/// Full deck legality report.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DeckValidationReport {
    pub legal: bool,
    pub format: DeckFormat,
    pub mainboard_count: u32,
    pub sideboard_count: u32,
    pub errors: Vec<String>,
}

/// Validates the deck against its format: size, copy limits, banlist, and
/// commander color identity. `cards` maps scryfall_id to cached metadata;
/// entries without metadata are only checked by name.
pub fn validate_deck(deck: &Deck, cards: &HashMap<String, Card>) -> DeckValidationReport {
    let mut errors = Vec::new();
    let format = deck.format;
    let mainboard = deck.mainboard_count();

    // Taille du deck
    if format.is_commander() {
        if deck.commander.is_none() {
            errors.push("A commander deck requires a designated commander".to_string());
        }
        let total = deck.total_with_commander();
        if total != 100 {
            errors.push(format!(
                "Commander decks must contain exactly 100 cards including the commander (found {})",
                total
            ));
        }
    } else {
        let (min, _) = format.mainboard_limits();
        if mainboard < min {
            errors.push(format!(
                "{} decks require at least {} mainboard cards (found {})",
                format.as_str(),
                min,
                mainboard
            ));
        }
    }

    // Limite de copies par nom (terrains de base exclus)
    let max_copies = format.max_copies();
    let mut copies: HashMap<&str, u32> = HashMap::new();
    for entry in deck.cards.iter().filter(|e| !e.sideboard) {
        *copies.entry(entry.card_name.as_str()).or_insert(0) += entry.quantity;
    }
    for (name, count) in &copies {
        if *count > max_copies && !is_basic_land(name) {
            errors.push(format!(
                "'{}' appears {} times, the limit is {} in {}",
                name,
                count,
                max_copies,
                format.as_str()
            ));
        }
    }

    // Banlist
    for entry in &deck.cards {
        if is_banned(&entry.card_name, format) {
            errors.push(format!("'{}' is banned in {}", entry.card_name, format.as_str()));
        }
    }
    if let Some(commander) = &deck.commander {
        if is_banned(&commander.card_name, format) {
            errors.push(format!(
                "Commander '{}' is banned in {}",
                commander.card_name,
                format.as_str()
            ));
        }
    }

    // Identité couleur du commandant
    if let Some(commander) = &deck.commander {
        for entry in &deck.cards {
            if let Some(card) = cards.get(&entry.card_id) {
                if !is_color_compatible(card, &commander.color_identity) {
                    errors.push(format!(
                        "'{}' is outside the commander's color identity",
                        entry.card_name
                    ));
                }
            }
        }
    }

    DeckValidationReport {
        legal: errors.is_empty(),
        format,
        mainboard_count: mainboard,
        sideboard_count: deck.sideboard_count(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardFace, Commander, DeckEntry};
    use serde_json::json;

    fn card(name: &str, identity: &[&str]) -> Card {
        serde_json::from_value::<crate::models::ScryfallCard>(json!({
            "id": name.to_lowercase().replace(' ', "-"),
            "name": name,
            "color_identity": identity,
        }))
        .unwrap()
        .into()
    }

    fn entry(card: &Card, qty: u32) -> DeckEntry {
        DeckEntry {
            card_id: card.scryfall_id.clone(),
            card_name: card.name.clone(),
            quantity: qty,
            sideboard: false,
        }
    }

    #[test]
    fn test_banlist_is_case_insensitive() {
        assert!(is_banned("Primeval Titan", DeckFormat::Commander));
        assert!(is_banned("primeval titan", DeckFormat::Commander));
        assert!(is_banned("PRIMEVAL TITAN", DeckFormat::Commander));
        assert!(!is_banned("Primeval Titan", DeckFormat::Modern));
        assert!(!is_banned("Llanowar Elves", DeckFormat::Commander));
    }

    #[test]
    fn test_color_identity_subset_check() {
        let commander_identity: Vec<String> = vec!["W".into(), "U".into(), "B".into()];

        assert!(is_color_compatible(&card("Esper Charm", &["W", "U", "B"]), &commander_identity));
        assert!(is_color_compatible(&card("Counterspell", &["U"]), &commander_identity));
        assert!(is_color_compatible(&card("Sol Ring", &[]), &commander_identity));
        assert!(!is_color_compatible(&card("Lightning Bolt", &["R"]), &commander_identity));
        assert!(!is_color_compatible(
            &card("Esper Charm", &["W", "U", "B"]),
            &["W".to_string(), "U".to_string()]
        ));
    }

    #[test]
    fn test_color_identity_unions_faces_when_field_missing() {
        let mut dfc = card("Growing Rites of Itlimoc", &[]);
        dfc.card_faces = Some(vec![
            CardFace {
                name: "Front".into(),
                printed_name: None,
                mana_cost: None,
                type_line: None,
                oracle_text: None,
                colors: Some(vec!["G".into()]),
                image_uris: None,
            },
            CardFace {
                name: "Back".into(),
                printed_name: None,
                mana_cost: None,
                type_line: None,
                oracle_text: None,
                colors: Some(vec!["U".into()]),
                image_uris: None,
            },
        ]);

        let identity = card_color_identity(&dfc);
        assert!(identity.contains("G"));
        assert!(identity.contains("U"));
        assert_eq!(identity.len(), 2);
    }

    #[test]
    fn test_commander_eligibility() {
        let mut atraxa = card("Atraxa, Praetors' Voice", &["W", "U", "B", "G"]);
        atraxa.type_line = Some("Legendary Creature — Phyrexian Angel Horror".into());
        assert!(commander_eligible(&atraxa));

        let mut bolt = card("Lightning Bolt", &["R"]);
        bolt.type_line = Some("Instant".into());
        assert!(!commander_eligible(&bolt));

        let mut sisay = card("Captain Sisay", &["W", "G"]);
        sisay.type_line = Some("Legendary Creature — Human Soldier".into());
        assert!(commander_eligible(&sisay));
    }

    #[test]
    fn test_validate_commander_deck_complete() {
        let mut deck =
            Deck::new("owner".into(), "EDH".into(), None, DeckFormat::Commander, false);
        let forest = card("Forest", &["G"]);
        let elves = card("Llanowar Elves", &["G"]);
        deck.commander = Some(Commander {
            card_id: "cmd".into(),
            card_name: "Omnath, Locus of Mana".into(),
            color_identity: vec!["G".into()],
        });
        deck.add_entry(entry(&forest, 95));
        deck.add_entry(entry(&elves, 4)); // 4 copies: singleton violation

        let mut lookup = HashMap::new();
        lookup.insert(forest.scryfall_id.clone(), forest.clone());
        lookup.insert(elves.scryfall_id.clone(), elves.clone());

        let report = validate_deck(&deck, &lookup);
        assert_eq!(report.mainboard_count, 99);
        assert!(!report.legal);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("Llanowar Elves"));
    }

    #[test]
    fn test_validate_commander_deck_legal() {
        let mut deck =
            Deck::new("owner".into(), "EDH".into(), None, DeckFormat::Commander, false);
        let forest = card("Forest", &["G"]);
        deck.commander = Some(Commander {
            card_id: "cmd".into(),
            card_name: "Omnath, Locus of Mana".into(),
            color_identity: vec!["G".into()],
        });
        // 99 basic lands: silly but legal
        deck.add_entry(entry(&forest, 99));

        let mut lookup = HashMap::new();
        lookup.insert(forest.scryfall_id.clone(), forest);

        let report = validate_deck(&deck, &lookup);
        assert!(report.legal, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn test_validate_flags_off_color_and_banned() {
        let mut deck =
            Deck::new("owner".into(), "EDH".into(), None, DeckFormat::Commander, false);
        let bolt = card("Lightning Bolt", &["R"]);
        let titan = card("Primeval Titan", &["G"]);
        deck.commander = Some(Commander {
            card_id: "cmd".into(),
            card_name: "Omnath, Locus of Mana".into(),
            color_identity: vec!["G".into()],
        });
        deck.add_entry(entry(&bolt, 1));
        deck.add_entry(entry(&titan, 1));

        let mut lookup = HashMap::new();
        lookup.insert(bolt.scryfall_id.clone(), bolt);
        lookup.insert(titan.scryfall_id.clone(), titan);

        let report = validate_deck(&deck, &lookup);
        assert!(!report.legal);
        assert!(report.errors.iter().any(|e| e.contains("color identity")));
        assert!(report.errors.iter().any(|e| e.contains("banned")));
        // deck size is also wrong (2 + commander != 100)
        assert!(report.errors.iter().any(|e| e.contains("exactly 100")));
    }

    #[test]
    fn test_validate_constructed_minimum_and_copies() {
        let mut deck =
            Deck::new("owner".into(), "Burn".into(), None, DeckFormat::Modern, false);
        let bolt = card("Lightning Bolt", &["R"]);
        let mountain = card("Mountain", &[]);
        deck.add_entry(entry(&bolt, 5)); // over the 4-copy limit
        deck.add_entry(entry(&mountain, 55)); // basics are exempt
        deck.add_entry(DeckEntry {
            card_id: "abrade".into(),
            card_name: "Abrade".into(),
            quantity: 2,
            sideboard: true,
        });

        let report = validate_deck(&deck, &HashMap::new());
        assert_eq!(report.sideboard_count, 2);
        assert!(!report.legal);
        assert!(report.errors.iter().any(|e| e.contains("limit is 4")));
        assert!(!report.errors.iter().any(|e| e.contains("Mountain")));
        // 60 cards total: size requirement satisfied
        assert!(!report.errors.iter().any(|e| e.contains("at least 60")));
    }

    #[test]
    fn test_validate_constructed_undersized() {
        let mut deck =
            Deck::new("owner".into(), "Brew".into(), None, DeckFormat::Standard, false);
        let bolt = card("Shock", &["R"]);
        deck.add_entry(entry(&bolt, 4));

        let report = validate_deck(&deck, &HashMap::new());
        assert!(report.errors.iter().any(|e| e.contains("at least 60")));
    }
}
