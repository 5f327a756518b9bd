use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw card payload as returned by the Scryfall API.
/// Only the fields we denormalize are declared; the proxy endpoints still
/// forward the untouched JSON to the client.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScryfallCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub printed_name: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub legalities: Option<HashMap<String, String>>,
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub prices: Option<CardPrices>,
}

/// Face d'une carte double-face (MDFC, transform, etc.)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub printed_name: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageUris {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CardPrices {
    #[serde(default)]
    pub usd: Option<String>,
    #[serde(default)]
    pub usd_foil: Option<String>,
    #[serde(default)]
    pub eur: Option<String>,
}

/// Cached card document (collection: cards), keyed by Scryfall ID.
/// Read-mostly: upserted whenever the proxy fetches a single card.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Card {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub scryfall_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printed_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oracle_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_uris: Option<ImageUris>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legalities: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices: Option<CardPrices>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

impl From<ScryfallCard> for Card {
    fn from(sc: ScryfallCard) -> Self {
        Card {
            id: None,
            scryfall_id: sc.id,
            name: sc.name,
            printed_name: sc.printed_name,
            lang: sc.lang,
            mana_cost: sc.mana_cost,
            cmc: sc.cmc,
            type_line: sc.type_line,
            oracle_text: sc.oracle_text,
            colors: sc.colors,
            color_identity: sc.color_identity,
            card_faces: sc.card_faces,
            image_uris: sc.image_uris,
            legalities: sc.legalities,
            set: sc.set,
            set_name: sc.set_name,
            rarity: sc.rarity,
            prices: sc.prices,
            updated_at: Some(BsonDateTime::now()),
        }
    }
}

impl Card {
    /// Display name, preferring the localized printed name.
    pub fn display_name(&self) -> &str {
        self.printed_name.as_deref().unwrap_or(&self.name)
    }

    /// USD price as a number (Scryfall serves prices as strings).
    pub fn price_usd(&self, foil: bool) -> Option<f64> {
        let prices = self.prices.as_ref()?;
        let raw = if foil { prices.usd_foil.as_ref() } else { prices.usd.as_ref() }?;
        raw.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scryfall_card_parses_minimal_payload() {
        let raw = json!({
            "id": "0b7020f2-1dfd-4bd7-9fd7-43a10e3ba316",
            "name": "Llanowar Elves",
            "color_identity": ["G"],
        });
        let card: ScryfallCard = serde_json::from_value(raw).unwrap();
        assert_eq!(card.name, "Llanowar Elves");
        assert_eq!(card.color_identity, vec!["G"]);
        assert!(card.card_faces.is_none());
    }

    #[test]
    fn test_display_name_prefers_printed_name() {
        let raw = json!({
            "id": "x",
            "name": "Llanowar Elves",
            "printed_name": "Elfes de Llanowar",
            "color_identity": ["G"],
        });
        let card: Card = serde_json::from_value::<ScryfallCard>(raw).unwrap().into();
        assert_eq!(card.display_name(), "Elfes de Llanowar");
    }

    #[test]
    fn test_price_parsing() {
        let card: Card = serde_json::from_value::<ScryfallCard>(json!({
            "id": "x",
            "name": "Sol Ring",
            "prices": {"usd": "1.50", "usd_foil": "12.00"},
        }))
        .unwrap()
        .into();

        assert_eq!(card.price_usd(false), Some(1.5));
        assert_eq!(card.price_usd(true), Some(12.0));
    }
}
