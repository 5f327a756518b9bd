use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// Card condition scale (état de la carte).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CardCondition {
    Mint,
    NearMint,
    Excellent,
    Good,
    LightPlayed,
    Played,
    Poor,
}

impl Default for CardCondition {
    fn default() -> Self {
        CardCondition::NearMint
    }
}

/// One owned printing inside a collection. Two entries are merged only when
/// the whole (card_id, condition, language, foil) tuple matches.
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct CollectionEntry {
    pub card_id: String,
    pub card_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub condition: CardCondition,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub foil: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_language() -> String {
    "fr".to_string()
}

impl CollectionEntry {
    pub fn same_printing(&self, other: &CollectionEntry) -> bool {
        self.card_id == other.card_id
            && self.condition == other.condition
            && self.language == other.language
            && self.foil == other.foil
    }
}

/// Collection document (collection: collections), owned by one user.
/// `total_cards` / `unique_cards` are derived and recomputed on every write.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Collection {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub owner_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub cards: Vec<CollectionEntry>,
    #[serde(default)]
    pub total_cards: u32,
    #[serde(default)]
    pub unique_cards: u32,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
}

impl Collection {
    pub fn new(owner_id: String, name: String, description: Option<String>, is_public: bool) -> Self {
        Collection {
            id: None,
            owner_id,
            name,
            description,
            is_public,
            cards: Vec::new(),
            total_cards: 0,
            unique_cards: 0,
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        }
    }

    /// Merge-or-push: incrémente la quantité si le même tirage existe déjà.
    pub fn add_entry(&mut self, entry: CollectionEntry) {
        if entry.quantity == 0 {
            return;
        }
        match self.cards.iter_mut().find(|e| e.same_printing(&entry)) {
            Some(existing) => {
                existing.quantity += entry.quantity;
                if entry.notes.is_some() {
                    existing.notes = entry.notes;
                }
            }
            None => self.cards.push(entry),
        }
        self.recompute_totals();
    }

    /// Sets the quantity of the first entry matching `card_id` (optionally
    /// narrowed by condition/language/foil). Quantity 0 removes the entry.
    /// Returns false when no entry matched.
    pub fn set_quantity(
        &mut self,
        card_id: &str,
        condition: Option<CardCondition>,
        language: Option<&str>,
        foil: Option<bool>,
        quantity: u32,
    ) -> bool {
        let matches = |e: &CollectionEntry| {
            e.card_id == card_id
                && condition.map_or(true, |c| e.condition == c)
                && language.map_or(true, |l| e.language == l)
                && foil.map_or(true, |f| e.foil == f)
        };

        let Some(pos) = self.cards.iter().position(|e| matches(e)) else {
            return false;
        };

        if quantity == 0 {
            self.cards.remove(pos);
        } else {
            self.cards[pos].quantity = quantity;
        }
        self.recompute_totals();
        true
    }

    /// Removes every entry for the card. Returns how many entries were dropped.
    pub fn remove_card(&mut self, card_id: &str) -> usize {
        let before = self.cards.len();
        self.cards.retain(|e| e.card_id != card_id);
        self.recompute_totals();
        before - self.cards.len()
    }

    pub fn recompute_totals(&mut self) {
        self.total_cards = self.cards.iter().map(|e| e.quantity).sum();
        self.unique_cards = self.cards.len() as u32;
        self.updated_at = Some(BsonDateTime::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(card_id: &str, qty: u32, condition: CardCondition, foil: bool) -> CollectionEntry {
        CollectionEntry {
            card_id: card_id.into(),
            card_name: format!("Card {}", card_id),
            quantity: qty,
            condition,
            language: "fr".into(),
            foil,
            notes: None,
        }
    }

    fn empty_collection() -> Collection {
        Collection::new("owner".into(), "Ma collection".into(), None, false)
    }

    #[test]
    fn test_same_tuple_add_increments_quantity() {
        let mut col = empty_collection();
        col.add_entry(entry("c1", 2, CardCondition::NearMint, false));
        col.add_entry(entry("c1", 3, CardCondition::NearMint, false));

        assert_eq!(col.cards.len(), 1);
        assert_eq!(col.cards[0].quantity, 5);
        assert_eq!(col.total_cards, 5);
        assert_eq!(col.unique_cards, 1);
    }

    #[test]
    fn test_different_tuple_creates_new_entry() {
        let mut col = empty_collection();
        col.add_entry(entry("c1", 1, CardCondition::NearMint, false));
        col.add_entry(entry("c1", 1, CardCondition::NearMint, true)); // foil
        col.add_entry(entry("c1", 1, CardCondition::Played, false)); // condition

        assert_eq!(col.cards.len(), 3);
        assert_eq!(col.total_cards, 3);
        assert_eq!(col.unique_cards, 3);
    }

    #[test]
    fn test_quantity_zero_removes_entry() {
        let mut col = empty_collection();
        col.add_entry(entry("c1", 4, CardCondition::NearMint, false));

        assert!(col.set_quantity("c1", None, None, None, 0));
        assert!(col.cards.is_empty());
        assert_eq!(col.total_cards, 0);
        assert_eq!(col.unique_cards, 0);
    }

    #[test]
    fn test_set_quantity_narrowed_by_foil() {
        let mut col = empty_collection();
        col.add_entry(entry("c1", 1, CardCondition::NearMint, false));
        col.add_entry(entry("c1", 1, CardCondition::NearMint, true));

        assert!(col.set_quantity("c1", None, None, Some(true), 7));
        let foil = col.cards.iter().find(|e| e.foil).unwrap();
        assert_eq!(foil.quantity, 7);
        assert_eq!(col.total_cards, 8);
    }

    #[test]
    fn test_set_quantity_unknown_card_returns_false() {
        let mut col = empty_collection();
        assert!(!col.set_quantity("ghost", None, None, None, 2));
    }

    #[test]
    fn test_remove_card_drops_all_printings() {
        let mut col = empty_collection();
        col.add_entry(entry("c1", 1, CardCondition::NearMint, false));
        col.add_entry(entry("c1", 1, CardCondition::NearMint, true));
        col.add_entry(entry("c2", 1, CardCondition::NearMint, false));

        assert_eq!(col.remove_card("c1"), 2);
        assert_eq!(col.cards.len(), 1);
        assert_eq!(col.cards[0].card_id, "c2");
    }

    #[test]
    fn test_zero_quantity_add_is_ignored() {
        let mut col = empty_collection();
        col.add_entry(entry("c1", 0, CardCondition::NearMint, false));
        assert!(col.cards.is_empty());
    }
}
