use crate::database::MongoDB;
use crate::middleware::auth::current_user;
use crate::services::deck_service;
use crate::services::deck_service::{
    AddDeckCardRequest, CreateDeckRequest, SetCommanderRequest, UpdateDeckCardRequest,
    UpdateDeckRequest,
};
use crate::utils::TtlCache;
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn list_decks(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("🎴 GET /api/decks - {}", user.user_id);

    match deck_service::list_decks(&db, &user.user_id).await {
        Ok(decks) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": decks.len(),
            "data": decks
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn create_deck(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<CreateDeckRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("🎴 POST /api/decks - {} ({})", request.name, user.user_id);

    match deck_service::create_deck(&db, &user.user_id, &request).await {
        Ok(deck) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn get_deck(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();

    match deck_service::get_deck(&db, &id, &user.user_id).await {
        Ok(deck) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn update_deck(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateDeckRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("✏️ PUT /api/decks/{} - {}", id, user.user_id);

    match deck_service::update_deck(&db, &id, &user.user_id, &request).await {
        Ok(deck) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn delete_deck(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/decks/{} - {}", id, user.user_id);

    match deck_service::delete_deck(&db, &id, &user.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Deck deleted"
        })),
        Err(e) => e.to_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/decks/{id}/cards",
    tag = "Decks",
    request_body = AddDeckCardRequest,
    responses(
        (status = 200, description = "Card added after legality checks"),
        (status = 400, description = "Card is banned, off-color, or over a limit"),
        (status = 403, description = "Not the deck owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_card(
    db: web::Data<MongoDB>,
    cache: web::Data<TtlCache>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<AddDeckCardRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("➕ POST /api/decks/{}/cards - card {}", id, request.card_id);

    match deck_service::add_card(&db, &cache, &id, &user.user_id, &request).await {
        Ok(deck) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn update_card(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    request: web::Json<UpdateDeckCardRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let (id, card_id) = path.into_inner();
    log::info!("✏️ PUT /api/decks/{}/cards/{}", id, card_id);

    match deck_service::update_card(&db, &id, &user.user_id, &card_id, &request).await {
        Ok(deck) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn remove_card(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let (id, card_id) = path.into_inner();
    log::info!("🗑️ DELETE /api/decks/{}/cards/{}", id, card_id);

    match deck_service::remove_card(&db, &id, &user.user_id, &card_id).await {
        Ok(deck) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn set_commander(
    db: web::Data<MongoDB>,
    cache: web::Data<TtlCache>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<SetCommanderRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("👑 PUT /api/decks/{}/commander - card {}", id, request.card_id);

    match deck_service::set_commander(&db, &cache, &id, &user.user_id, &request).await {
        Ok(deck) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn clone_deck(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("📋 POST /api/decks/{}/clone - {}", id, user.user_id);

    match deck_service::clone_deck(&db, &id, &user.user_id).await {
        Ok(deck) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": deck
        })),
        Err(e) => e.to_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/decks/{id}/validate",
    tag = "Decks",
    responses(
        (status = 200, description = "Legality report for the deck's format"),
        (status = 404, description = "Deck not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn validate_deck(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("⚖️ GET /api/decks/{}/validate", id);

    match deck_service::validate_deck(&db, &id, &user.user_id).await {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": report
        })),
        Err(e) => e.to_response(),
    }
}
