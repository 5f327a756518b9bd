use crate::database::MongoDB;
use crate::models::{Card, Collection, Deck};
use crate::utils::AppError;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use serde::Serialize;
use std::collections::HashMap;

/// Dashboard aggregates, computed from real data only (no demo fallback).
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub total_cards: u32,
    pub unique_cards: u32,
    pub total_collections: u32,
    pub total_decks: u32,
    pub decks_by_format: HashMap<String, u32>,
    /// Quantités par couleur d'identité (C = incolore)
    pub color_distribution: HashMap<String, u32>,
    pub estimated_value_usd: f64,
}

pub async fn dashboard(db: &MongoDB, user_id: &str) -> Result<DashboardStats, AppError> {
    let collections_col = db.collection::<Collection>("collections");
    let cursor = collections_col
        .find(doc! { "owner_id": user_id })
        .await
        .map_err(AppError::database)?;
    let collections: Vec<Collection> = cursor.try_collect().await.map_err(AppError::database)?;

    let decks_col = db.collection::<Deck>("decks");
    let cursor = decks_col
        .find(doc! { "owner_id": user_id })
        .await
        .map_err(AppError::database)?;
    let decks: Vec<Deck> = cursor.try_collect().await.map_err(AppError::database)?;

    // Join des entrées contre le cache de cartes pour couleurs et prix
    let ids: Vec<String> = collections
        .iter()
        .flat_map(|c| c.cards.iter().map(|e| e.card_id.clone()))
        .collect();

    let lookup = if ids.is_empty() {
        HashMap::new()
    } else {
        let cards_col = db.collection::<Card>("cards");
        let cursor = cards_col
            .find(doc! { "scryfall_id": { "$in": ids } })
            .await
            .map_err(AppError::database)?;
        let cards: Vec<Card> = cursor.try_collect().await.map_err(AppError::database)?;
        cards.into_iter().map(|c| (c.scryfall_id.clone(), c)).collect()
    };

    Ok(compute_dashboard(&collections, &decks, &lookup))
}

fn compute_dashboard(
    collections: &[Collection],
    decks: &[Deck],
    cards: &HashMap<String, Card>,
) -> DashboardStats {
    let total_cards = collections.iter().map(|c| c.total_cards).sum();
    let unique_cards = collections.iter().map(|c| c.unique_cards).sum();

    let mut decks_by_format: HashMap<String, u32> = HashMap::new();
    for deck in decks {
        *decks_by_format.entry(deck.format.as_str().to_string()).or_insert(0) += 1;
    }

    let mut color_distribution: HashMap<String, u32> = HashMap::new();
    let mut estimated_value_usd = 0.0;

    for collection in collections {
        for entry in &collection.cards {
            let Some(card) = cards.get(&entry.card_id) else {
                continue;
            };

            if card.color_identity.is_empty() {
                *color_distribution.entry("C".to_string()).or_insert(0) += entry.quantity;
            } else {
                for color in &card.color_identity {
                    *color_distribution.entry(color.clone()).or_insert(0) += entry.quantity;
                }
            }

            if let Some(price) = card.price_usd(entry.foil) {
                estimated_value_usd += price * entry.quantity as f64;
            }
        }
    }

    DashboardStats {
        total_cards,
        unique_cards,
        total_collections: collections.len() as u32,
        total_decks: decks.len() as u32,
        decks_by_format,
        color_distribution,
        estimated_value_usd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardCondition, CollectionEntry, DeckFormat, ScryfallCard};
    use serde_json::json;

    fn card(id: &str, identity: &[&str], usd: &str) -> Card {
        serde_json::from_value::<ScryfallCard>(json!({
            "id": id,
            "name": id,
            "color_identity": identity,
            "prices": {"usd": usd},
        }))
        .unwrap()
        .into()
    }

    fn collection_with(entries: Vec<CollectionEntry>) -> Collection {
        let mut col = Collection::new("u1".into(), "c".into(), None, false);
        for e in entries {
            col.add_entry(e);
        }
        col
    }

    fn entry(card_id: &str, qty: u32) -> CollectionEntry {
        CollectionEntry {
            card_id: card_id.into(),
            card_name: card_id.into(),
            quantity: qty,
            condition: CardCondition::NearMint,
            language: "fr".into(),
            foil: false,
            notes: None,
        }
    }

    #[test]
    fn test_empty_account_is_all_zeros() {
        let stats = compute_dashboard(&[], &[], &HashMap::new());
        assert_eq!(stats.total_cards, 0);
        assert_eq!(stats.total_decks, 0);
        assert_eq!(stats.estimated_value_usd, 0.0);
        assert!(stats.color_distribution.is_empty());
    }

    #[test]
    fn test_aggregates_colors_and_value() {
        let bolt = card("bolt", &["R"], "2.00");
        let ring = card("ring", &[], "1.50");
        let mut lookup = HashMap::new();
        lookup.insert("bolt".to_string(), bolt);
        lookup.insert("ring".to_string(), ring);

        let col = collection_with(vec![entry("bolt", 4), entry("ring", 2)]);
        let decks = vec![
            Deck::new("u1".into(), "d1".into(), None, DeckFormat::Commander, false),
            Deck::new("u1".into(), "d2".into(), None, DeckFormat::Commander, false),
            Deck::new("u1".into(), "d3".into(), None, DeckFormat::Modern, false),
        ];

        let stats = compute_dashboard(&[col], &decks, &lookup);
        assert_eq!(stats.total_cards, 6);
        assert_eq!(stats.unique_cards, 2);
        assert_eq!(stats.total_decks, 3);
        assert_eq!(stats.decks_by_format["commander"], 2);
        assert_eq!(stats.decks_by_format["modern"], 1);
        assert_eq!(stats.color_distribution["R"], 4);
        assert_eq!(stats.color_distribution["C"], 2);
        assert!((stats.estimated_value_usd - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_entries_without_cached_metadata_are_skipped() {
        let col = collection_with(vec![entry("unknown", 3)]);
        let stats = compute_dashboard(&[col], &[], &HashMap::new());
        // totals still count the entry, colors/value need metadata
        assert_eq!(stats.total_cards, 3);
        assert!(stats.color_distribution.is_empty());
        assert_eq!(stats.estimated_value_usd, 0.0);
    }
}
