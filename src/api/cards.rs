use crate::database::MongoDB;
use crate::services::scryfall_service;
use crate::utils::TtlCache;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    #[serde(default)]
    pub exact: bool,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub q: String,
}

#[utoipa::path(
    get,
    path = "/api/cards/search",
    tag = "Cards",
    params(
        ("q" = String, Query, description = "Scryfall search query (French first, English fallback)"),
        ("page" = Option<u32>, Query, description = "Result page")
    ),
    responses(
        (status = 200, description = "Card list from Scryfall"),
        (status = 404, description = "No cards matched"),
        (status = 502, description = "Scryfall unavailable")
    )
)]
pub async fn search(cache: web::Data<TtlCache>, query: web::Query<SearchQuery>) -> HttpResponse {
    log::info!("🔍 GET /api/cards/search - q: {}", query.q);

    match scryfall_service::search_cards(&cache, &query.q, query.page).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

pub async fn named(cache: web::Data<TtlCache>, query: web::Query<NamedQuery>) -> HttpResponse {
    log::info!("🃏 GET /api/cards/named - name: {} (exact: {})", query.name, query.exact);

    match scryfall_service::get_card_named(&cache, &query.name, query.exact).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

pub async fn random() -> HttpResponse {
    log::info!("🎲 GET /api/cards/random");

    match scryfall_service::random_card().await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

pub async fn autocomplete(
    cache: web::Data<TtlCache>,
    query: web::Query<AutocompleteQuery>,
) -> HttpResponse {
    match scryfall_service::autocomplete(&cache, &query.q).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

pub async fn sets(cache: web::Data<TtlCache>) -> HttpResponse {
    log::info!("📦 GET /api/cards/sets");

    match scryfall_service::list_sets(&cache).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

pub async fn symbology(cache: web::Data<TtlCache>) -> HttpResponse {
    match scryfall_service::symbology(&cache).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}

// DOIT RESTER EN DERNIER dans le scope (catch-all sur l'id)
pub async fn get_card(
    db: web::Data<MongoDB>,
    cache: web::Data<TtlCache>,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    log::info!("🃏 GET /api/cards/{}", id);

    match scryfall_service::get_card_raw(&db, &cache, &id).await {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => e.to_response(),
    }
}
