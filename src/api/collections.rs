use crate::database::MongoDB;
use crate::middleware::auth::current_user;
use crate::services::collection_service;
use crate::services::collection_service::{
    AddCardRequest, CreateCollectionRequest, UpdateCardRequest, UpdateCollectionRequest,
};
use crate::utils::TtlCache;
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn list_collections(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("📚 GET /api/collections - {}", user.user_id);

    match collection_service::list_collections(&db, &user.user_id).await {
        Ok(collections) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": collections.len(),
            "data": collections
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn create_collection(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<CreateCollectionRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("📚 POST /api/collections - {} ({})", request.name, user.user_id);

    match collection_service::create_collection(&db, &user.user_id, &request).await {
        Ok(collection) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": collection
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn get_collection(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();

    match collection_service::get_collection(&db, &id, &user.user_id).await {
        Ok(collection) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": collection
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn update_collection(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<UpdateCollectionRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("✏️ PUT /api/collections/{} - {}", id, user.user_id);

    match collection_service::update_collection(&db, &id, &user.user_id, &request).await {
        Ok(collection) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": collection
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn delete_collection(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/collections/{} - {}", id, user.user_id);

    match collection_service::delete_collection(&db, &id, &user.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Collection deleted"
        })),
        Err(e) => e.to_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/collections/{id}/cards",
    tag = "Collections",
    request_body = AddCardRequest,
    responses(
        (status = 200, description = "Card added (same printing merges into the existing entry)"),
        (status = 403, description = "Not the collection owner"),
        (status = 404, description = "Collection or card not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_card(
    db: web::Data<MongoDB>,
    cache: web::Data<TtlCache>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<AddCardRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let id = path.into_inner();
    log::info!("➕ POST /api/collections/{}/cards - card {}", id, request.card_id);

    match collection_service::add_card(&db, &cache, &id, &user.user_id, &request).await {
        Ok(collection) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": collection
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn update_card(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    request: web::Json<UpdateCardRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let (id, card_id) = path.into_inner();
    log::info!("✏️ PUT /api/collections/{}/cards/{}", id, card_id);

    match collection_service::update_card(&db, &id, &user.user_id, &card_id, &request).await {
        Ok(collection) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": collection
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
    log::info!("🗑️ DELETE /api/collections/{}/cards/{}", id, card_id);

    match collection_service::remove_card(&db, &id, &user.user_id, &card_id).await {
        Ok(collection) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": collection
        })),
        Err(e) => e.to_response(),
    }
}
