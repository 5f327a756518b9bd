use crate::database::MongoDB;
use crate::models::{Card, Commander, Deck, DeckEntry, DeckFormat};
use crate::services::collection_service::{ensure_owner, parse_object_id};
use crate::services::{legality, scryfall_service};
use crate::utils::{AppError, TtlCache};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateDeckRequest {
    pub name: String,
    pub description: Option<String>,
    pub format: DeckFormat,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateDeckRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddDeckCardRequest {
    pub card_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub sideboard: bool,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateDeckCardRequest {
    pub quantity: u32,
    pub sideboard: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SetCommanderRequest {
    pub card_id: String,
}

pub async fn list_decks(db: &MongoDB, owner_id: &str) -> Result<Vec<Deck>, AppError> {
    let decks = db.collection::<Deck>("decks");
    let cursor = decks
        .find(doc! { "owner_id": owner_id })
        .await
        .map_err(AppError::database)?;
    cursor.try_collect().await.map_err(AppError::database)
}

pub async fn create_deck(
    db: &MongoDB,
    owner_id: &str,
    request: &CreateDeckRequest,
) -> Result<Deck, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Deck name is required".to_string()));
    }

    let mut deck = Deck::new(
        owner_id.to_string(),
        request.name.trim().to_string(),
        request.description.clone(),
        request.format,
        request.is_public,
    );

    let decks = db.collection::<Deck>("decks");
    let result = decks.insert_one(&deck).await.map_err(AppError::database)?;
    deck.id = result.inserted_id.as_object_id();

    log::info!("🎴 Deck created: {} [{}] (owner: {})", deck.name, deck.format.as_str(), owner_id);
    Ok(deck)
}

pub async fn get_deck(db: &MongoDB, id: &str, requester_id: &str) -> Result<Deck, AppError> {
    let oid = parse_object_id(id)?;
    let decks = db.collection::<Deck>("decks");

    let deck = decks
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("Deck".to_string()))?;

    if !deck.is_public {
        ensure_owner(&deck.owner_id, requester_id)?;
    }
    Ok(deck)
}

async fn get_owned_deck(db: &MongoDB, id: &str, requester_id: &str) -> Result<Deck, AppError> {
    let oid = parse_object_id(id)?;
    let decks = db.collection::<Deck>("decks");

    let deck = decks
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("Deck".to_string()))?;

    ensure_owner(&deck.owner_id, requester_id)?;
    Ok(deck)
}

async fn save_deck(db: &MongoDB, deck: &Deck) -> Result<(), AppError> {
    let oid = deck.id.ok_or_else(|| AppError::Database("Deck without _id".to_string()))?;
    db.collection::<Deck>("decks")
        .replace_one(doc! { "_id": oid }, deck)
        .await
        .map_err(AppError::database)?;
    Ok(())
}

pub async fn update_deck(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
    request: &UpdateDeckRequest,
) -> Result<Deck, AppError> {
    let mut deck = get_owned_deck(db, id, requester_id).await?;

    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidRequest("Deck name is required".to_string()));
        }
        deck.name = name.trim().to_string();
    }
    if let Some(description) = &request.description {
        deck.description = Some(description.clone());
    }
    if let Some(is_public) = request.is_public {
        deck.is_public = is_public;
    }
    deck.updated_at = Some(BsonDateTime::now());

    save_deck(db, &deck).await?;
    Ok(deck)
}

pub async fn delete_deck(db: &MongoDB, id: &str, requester_id: &str) -> Result<(), AppError> {
    let deck = get_owned_deck(db, id, requester_id).await?;
    let oid = deck.id.ok_or_else(|| AppError::Database("Deck without _id".to_string()))?;

    db.collection::<Deck>("decks")
        .delete_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?;

    log::info!("🗑️ Deck deleted: {} (owner: {})", deck.name, requester_id);
    Ok(())
}

/// Adds a card after checking it is legal for the deck: banlist, commander
/// color identity, mainboard size and copy limits.
pub async fn add_card(
    db: &MongoDB,
    cache: &TtlCache,
    id: &str,
    requester_id: &str,
    request: &AddDeckCardRequest,
) -> Result<Deck, AppError> {
    if request.quantity == 0 {
        return Err(AppError::InvalidRequest("Quantity must be at least 1".to_string()));
    }

    let mut deck = get_owned_deck(db, id, requester_id).await?;
    let card = scryfall_service::get_card(db, cache, &request.card_id).await?;

    if legality::is_banned(&card.name, deck.format) {
        return Err(AppError::InvalidRequest(format!(
            "'{}' is banned in {}",
            card.name,
            deck.format.as_str()
        )));
    }

    if let Some(commander) = &deck.commander {
        if !legality::is_color_compatible(&card, &commander.color_identity) {
            return Err(AppError::InvalidRequest(format!(
                "'{}' is outside the color identity of commander '{}'",
                card.name, commander.card_name
            )));
        }
    }

    if deck.format.is_commander() && !request.sideboard {
        let (_, max) = deck.format.mainboard_limits();
        if let Some(max) = max {
            if deck.mainboard_count() + request.quantity > max {
                return Err(AppError::InvalidRequest(format!(
                    "Commander decks are limited to {} mainboard cards besides the commander",
                    max
                )));
            }
        }
    }

    if !legality::is_basic_land(&card.name) {
        let existing: u32 = deck
            .cards
            .iter()
            .filter(|e| !e.sideboard && e.card_name == card.name)
            .map(|e| e.quantity)
            .sum();
        if !request.sideboard && existing + request.quantity > deck.format.max_copies() {
            return Err(AppError::InvalidRequest(format!(
                "'{}' is limited to {} copies in {}",
                card.name,
                deck.format.max_copies(),
                deck.format.as_str()
            )));
        }
    }

    deck.add_entry(DeckEntry {
        card_id: request.card_id.clone(),
        card_name: card.name.clone(),
        quantity: request.quantity,
        sideboard: request.sideboard,
    });

    save_deck(db, &deck).await?;
    log::info!("➕ Card {} x{} added to deck {}", card.name, request.quantity, id);
    Ok(deck)
}

pub async fn update_card(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
    card_id: &str,
    request: &UpdateDeckCardRequest,
) -> Result<Deck, AppError> {
    let mut deck = get_owned_deck(db, id, requester_id).await?;

    if !deck.set_quantity(card_id, request.sideboard, request.quantity) {
        return Err(AppError::NotFound("Card entry".to_string()));
    }

    save_deck(db, &deck).await?;
    Ok(deck)
}

pub async fn remove_card(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
    card_id: &str,
) -> Result<Deck, AppError> {
    let mut deck = get_owned_deck(db, id, requester_id).await?;

    if deck.remove_card(card_id) == 0 {
        return Err(AppError::NotFound("Card entry".to_string()));
    }

    save_deck(db, &deck).await?;
    Ok(deck)
}

/// Sets or replaces the commander. Only one commander per deck; the card
/// must be a legendary creature and the deck a commander format.
pub async fn set_commander(
    db: &MongoDB,
    cache: &TtlCache,
    id: &str,
    requester_id: &str,
    request: &SetCommanderRequest,
) -> Result<Deck, AppError> {
    let mut deck = get_owned_deck(db, id, requester_id).await?;

    if !deck.format.is_commander() {
        return Err(AppError::InvalidRequest(format!(
            "{} decks do not have a commander",
            deck.format.as_str()
        )));
    }

    let card = scryfall_service::get_card(db, cache, &request.card_id).await?;

    if !legality::commander_eligible(&card) {
        return Err(AppError::InvalidRequest(format!(
            "'{}' cannot be a commander (legendary creatures only)",
            card.name
        )));
    }
    if legality::is_banned(&card.name, deck.format) {
        return Err(AppError::InvalidRequest(format!(
            "'{}' is banned in {}",
            card.name,
            deck.format.as_str()
        )));
    }

    let mut identity: Vec<String> = legality::card_color_identity(&card).into_iter().collect();
    identity.sort();

    deck.commander = Some(Commander {
        card_id: card.scryfall_id.clone(),
        card_name: card.name.clone(),
        color_identity: identity,
    });
    deck.touch();

    save_deck(db, &deck).await?;
    log::info!("👑 Commander set on deck {}: {}", id, card.name);
    Ok(deck)
}

/// Deep copy of a readable deck, owned by the caller.
pub async fn clone_deck(db: &MongoDB, id: &str, requester_id: &str) -> Result<Deck, AppError> {
    let source = get_deck(db, id, requester_id).await?;

    let mut copy = source.clone();
    copy.id = None;
    copy.owner_id = requester_id.to_string();
    copy.name = format!("Copie de {}", source.name);
    copy.is_public = false;
    copy.created_at = Some(BsonDateTime::now());
    copy.updated_at = Some(BsonDateTime::now());

    let decks = db.collection::<Deck>("decks");
    let result = decks.insert_one(&copy).await.map_err(AppError::database)?;
    copy.id = result.inserted_id.as_object_id();

    log::info!("📋 Deck {} cloned by {}", id, requester_id);
    Ok(copy)
}

/// Full legality report, joining entries against the cached card metadata.
pub async fn validate_deck(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
) -> Result<legality::DeckValidationReport, AppError> {
    let deck = get_deck(db, id, requester_id).await?;

    let ids: Vec<String> = deck.cards.iter().map(|e| e.card_id.clone()).collect();
    let cards = db.collection::<Card>("cards");
    let cursor = cards
        .find(doc! { "scryfall_id": { "$in": ids } })
        .await
        .map_err(AppError::database)?;
    let found: Vec<Card> = cursor.try_collect().await.map_err(AppError::database)?;

    let lookup: HashMap<String, Card> =
        found.into_iter().map(|c| (c.scryfall_id.clone(), c)).collect();

    Ok(legality::validate_deck(&deck, &lookup))
}
