use crate::database::MongoDB;
use crate::models::{CardCondition, Collection, CollectionEntry};
use crate::services::scryfall_service;
use crate::utils::{AppError, TtlCache};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCollectionRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AddCardRequest {
    pub card_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub condition: CardCondition,
    pub language: Option<String>,
    #[serde(default)]
    pub foil: bool,
    pub notes: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCardRequest {
    pub quantity: u32,
    pub condition: Option<CardCondition>,
    pub language: Option<String>,
    pub foil: Option<bool>,
}

/// Vérification de propriété partagée par toutes les mutations.
pub fn ensure_owner(owner_id: &str, user_id: &str) -> Result<(), AppError> {
    if owner_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid id: {}", id)))
}

pub async fn list_collections(db: &MongoDB, owner_id: &str) -> Result<Vec<Collection>, AppError> {
    let collection = db.collection::<Collection>("collections");

    let cursor = collection
        .find(doc! { "owner_id": owner_id })
        .await
        .map_err(AppError::database)?;

    cursor.try_collect().await.map_err(AppError::database)
}

pub async fn create_collection(
    db: &MongoDB,
    owner_id: &str,
    request: &CreateCollectionRequest,
) -> Result<Collection, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Collection name is required".to_string()));
    }

    let mut new_collection = Collection::new(
        owner_id.to_string(),
        request.name.trim().to_string(),
        request.description.clone(),
        request.is_public,
    );

    let collection = db.collection::<Collection>("collections");
    let result = collection
        .insert_one(&new_collection)
        .await
        .map_err(AppError::database)?;

    new_collection.id = result.inserted_id.as_object_id();
    log::info!("📚 Collection created: {} (owner: {})", new_collection.name, owner_id);
    Ok(new_collection)
}

/// Fetches a collection, enforcing visibility: private collections are
/// readable by their owner only.
pub async fn get_collection(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
) -> Result<Collection, AppError> {
    let oid = parse_object_id(id)?;
    let collection = db.collection::<Collection>("collections");

    let found = collection
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

    if !found.is_public {
        ensure_owner(&found.owner_id, requester_id)?;
    }
    Ok(found)
}

/// Fetches a collection for mutation: owner only, public or not.
async fn get_owned_collection(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
) -> Result<Collection, AppError> {
    let oid = parse_object_id(id)?;
    let collection = db.collection::<Collection>("collections");

    let found = collection
        .find_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("Collection".to_string()))?;

    ensure_owner(&found.owner_id, requester_id)?;
    Ok(found)
}

async fn save_collection(db: &MongoDB, col: &Collection) -> Result<(), AppError> {
    let oid = col.id.ok_or_else(|| AppError::Database("Collection without _id".to_string()))?;
    db.collection::<Collection>("collections")
        .replace_one(doc! { "_id": oid }, col)
        .await
        .map_err(AppError::database)?;
    Ok(())
}

pub async fn update_collection(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
    request: &UpdateCollectionRequest,
) -> Result<Collection, AppError> {
    let mut col = get_owned_collection(db, id, requester_id).await?;

    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidRequest("Collection name is required".to_string()));
        }
        col.name = name.trim().to_string();
    }
    if let Some(description) = &request.description {
        col.description = Some(description.clone());
    }
    if let Some(is_public) = request.is_public {
        col.is_public = is_public;
    }
    col.updated_at = Some(BsonDateTime::now());

    save_collection(db, &col).await?;
    Ok(col)
}

pub async fn delete_collection(db: &MongoDB, id: &str, requester_id: &str) -> Result<(), AppError> {
    let col = get_owned_collection(db, id, requester_id).await?;
    let oid = col.id.ok_or_else(|| AppError::Database("Collection without _id".to_string()))?;

    db.collection::<Collection>("collections")
        .delete_one(doc! { "_id": oid })
        .await
        .map_err(AppError::database)?;

    log::info!("🗑️ Collection deleted: {} (owner: {})", col.name, requester_id);
    Ok(())
}

/// Adds a card: same (card_id, condition, language, foil) tuple increments
/// the existing entry, anything else pushes a new one. The card name is
/// denormalized from the Scryfall cache.
pub async fn add_card(
    db: &MongoDB,
    cache: &TtlCache,
    id: &str,
    requester_id: &str,
    request: &AddCardRequest,
) -> Result<Collection, AppError> {
    if request.quantity == 0 {
        return Err(AppError::InvalidRequest("Quantity must be at least 1".to_string()));
    }

    let mut col = get_owned_collection(db, id, requester_id).await?;

    let card = scryfall_service::get_card(db, cache, &request.card_id).await?;

    // Nom dénormalisé : version localisée quand Scryfall la fournit
    col.add_entry(CollectionEntry {
        card_id: request.card_id.clone(),
        card_name: card.display_name().to_string(),
        quantity: request.quantity,
        condition: request.condition,
        language: request
            .language
            .clone()
            .unwrap_or_else(|| card.lang.clone().unwrap_or_else(|| "fr".to_string())),
        foil: request.foil,
        notes: request.notes.clone(),
    });

    save_collection(db, &col).await?;
    log::info!("➕ Card {} x{} added to collection {}", card.display_name(), request.quantity, id);
    Ok(col)
}

/// Updates an entry's quantity (0 removes it), optionally narrowed by
/// condition/language/foil when several printings of the card coexist.
pub async fn update_card(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
    card_id: &str,
    request: &UpdateCardRequest,
) -> Result<Collection, AppError> {
    let mut col = get_owned_collection(db, id, requester_id).await?;

    let found = col.set_quantity(
        card_id,
        request.condition,
        request.language.as_deref(),
        request.foil,
        request.quantity,
    );
    if !found {
        return Err(AppError::NotFound("Card entry".to_string()));
    }

    save_collection(db, &col).await?;
    Ok(col)
}

pub async fn remove_card(
    db: &MongoDB,
    id: &str,
    requester_id: &str,
    card_id: &str,
) -> Result<Collection, AppError> {
    let mut col = get_owned_collection(db, id, requester_id).await?;

    if col.remove_card(card_id) == 0 {
        return Err(AppError::NotFound("Card entry".to_string()));
    }

    save_collection(db, &col).await?;
    Ok(col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner("u1", "u1").is_ok());
        assert!(matches!(ensure_owner("u1", "u2"), Err(AppError::Forbidden)));
    }

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        assert!(parse_object_id("not-an-oid").is_err());
        assert!(parse_object_id("64f000000000000000000001").is_ok());
    }
}
