use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// Supported play formats.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeckFormat {
    Commander,
    DuelCommander,
    Standard,
    Pioneer,
    Modern,
    Legacy,
    Vintage,
    Pauper,
}

impl DeckFormat {
    /// Formats commandant : 100 cartes exactement, singleton, identité couleur.
    pub fn is_commander(&self) -> bool {
        matches!(self, DeckFormat::Commander | DeckFormat::DuelCommander)
    }

    /// Mainboard size limits: (min, max), commander excluded for EDH.
    pub fn mainboard_limits(&self) -> (u32, Option<u32>) {
        if self.is_commander() {
            (99, Some(99))
        } else {
            (60, None)
        }
    }

    /// Max copies of a single name (basic lands excepted).
    pub fn max_copies(&self) -> u32 {
        if self.is_commander() {
            1
        } else {
            4
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeckFormat::Commander => "commander",
            DeckFormat::DuelCommander => "duel_commander",
            DeckFormat::Standard => "standard",
            DeckFormat::Pioneer => "pioneer",
            DeckFormat::Modern => "modern",
            DeckFormat::Legacy => "legacy",
            DeckFormat::Vintage => "vintage",
            DeckFormat::Pauper => "pauper",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct DeckEntry {
    pub card_id: String,
    pub card_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub sideboard: bool,
}

/// Designated commander, with its color identity denormalized so legality
/// checks don't refetch the card.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct Commander {
    pub card_id: String,
    pub card_name: String,
    #[serde(default)]
    pub color_identity: Vec<String>,
}

/// Deck document (collection: decks), owned by one user.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Deck {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub format: DeckFormat,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub cards: Vec<DeckEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commander: Option<Commander>,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

impl Deck {
    pub fn new(
        owner_id: String,
        name: String,
        description: Option<String>,
        format: DeckFormat,
        is_public: bool,
    ) -> Self {
        Deck {
            id: None,
            owner_id,
            name,
            description,
            format,
            is_public,
            cards: Vec::new(),
            commander: None,
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        }
    }

    pub fn mainboard_count(&self) -> u32 {
        self.cards.iter().filter(|e| !e.sideboard).map(|e| e.quantity).sum()
    }

    pub fn sideboard_count(&self) -> u32 {
        self.cards.iter().filter(|e| e.sideboard).map(|e| e.quantity).sum()
    }

    /// Mainboard plus commander, the number that must reach 100 in EDH.
    pub fn total_with_commander(&self) -> u32 {
        self.mainboard_count() + if self.commander.is_some() { 1 } else { 0 }
    }

    /// Merge-or-push within the same board (main vs sideboard).
    pub fn add_entry(&mut self, entry: DeckEntry) {
        if entry.quantity == 0 {
            return;
        }
        match self
            .cards
            .iter_mut()
            .find(|e| e.card_id == entry.card_id && e.sideboard == entry.sideboard)
        {
            Some(existing) => existing.quantity += entry.quantity,
            None => self.cards.push(entry),
        }
        self.touch();
    }

    /// Quantity 0 removes the entry. Returns false when no entry matched.
    pub fn set_quantity(&mut self, card_id: &str, sideboard: Option<bool>, quantity: u32) -> bool {
        let matches =
            |e: &DeckEntry| e.card_id == card_id && sideboard.map_or(true, |s| e.sideboard == s);

        let Some(pos) = self.cards.iter().position(|e| matches(e)) else {
            return false;
        };

        if quantity == 0 {
            self.cards.remove(pos);
        } else {
            self.cards[pos].quantity = quantity;
        }
        self.touch();
        true
    }

    /// Removes the card from every board; clears the commander slot if it
    /// pointed at the same card.
    pub fn remove_card(&mut self, card_id: &str) -> usize {
        let before = self.cards.len();
        self.cards.retain(|e| e.card_id != card_id);
        if self.commander.as_ref().is_some_and(|c| c.card_id == card_id) {
            self.commander = None;
        }
        self.touch();
        before - self.cards.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(BsonDateTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(card_id: &str, qty: u32, sideboard: bool) -> DeckEntry {
        DeckEntry {
            card_id: card_id.into(),
            card_name: format!("Card {}", card_id),
            quantity: qty,
            sideboard,
        }
    }

    fn commander_deck() -> Deck {
        Deck::new("owner".into(), "Mon deck".into(), None, DeckFormat::Commander, false)
    }

    #[test]
    fn test_add_merges_within_board() {
        let mut deck = commander_deck();
        deck.add_entry(entry("c1", 1, false));
        deck.add_entry(entry("c1", 2, false));
        deck.add_entry(entry("c1", 1, true)); // sideboard stays separate

        assert_eq!(deck.cards.len(), 2);
        assert_eq!(deck.mainboard_count(), 3);
        assert_eq!(deck.sideboard_count(), 1);
    }

    #[test]
    fn test_quantity_zero_removes_entry() {
        let mut deck = commander_deck();
        deck.add_entry(entry("c1", 2, false));

        assert!(deck.set_quantity("c1", None, 0));
        assert!(deck.cards.is_empty());
    }

    #[test]
    fn test_remove_card_clears_commander_slot() {
        let mut deck = commander_deck();
        deck.commander = Some(Commander {
            card_id: "cmd".into(),
            card_name: "Atraxa, Praetors' Voice".into(),
            color_identity: vec!["W".into(), "U".into(), "B".into(), "G".into()],
        });
        deck.add_entry(entry("cmd", 1, false));

        deck.remove_card("cmd");
        assert!(deck.commander.is_none());
        assert!(deck.cards.is_empty());
    }

    #[test]
    fn test_total_with_commander() {
        let mut deck = commander_deck();
        deck.add_entry(entry("c1", 99, false));
        assert_eq!(deck.total_with_commander(), 99);

        deck.commander = Some(Commander {
            card_id: "cmd".into(),
            card_name: "Gisela".into(),
            color_identity: vec!["W".into(), "R".into()],
        });
        assert_eq!(deck.total_with_commander(), 100);
    }

    #[test]
    fn test_format_limits() {
        assert_eq!(DeckFormat::Commander.mainboard_limits(), (99, Some(99)));
        assert_eq!(DeckFormat::Modern.mainboard_limits(), (60, None));
        assert_eq!(DeckFormat::Commander.max_copies(), 1);
        assert_eq!(DeckFormat::Standard.max_copies(), 4);
    }
}
