use crate::database::MongoDB;
use crate::middleware::auth::current_user;
use crate::services::collection_service::ensure_owner;
use crate::services::{auth_service, user_service};
use actix_web::{web, HttpRequest, HttpResponse};

pub async fn get_user(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let target_id = path.into_inner();
    log::info!("👤 GET /api/users/{} (by {})", target_id, user.user_id);

    match user_service::get_profile(&db, &target_id, &user.user_id).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": profile
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn update_user(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<auth_service::UpdateProfileRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let target_id = path.into_inner();
    log::info!("✏️ PUT /api/users/{} (by {})", target_id, user.user_id);

    // Seul le propriétaire du compte peut le modifier
    if let Err(e) = ensure_owner(&target_id, &user.user_id) {
        return e.to_response();
    }

    match auth_service::update_profile(&db, &target_id, &request).await {
        Ok(info) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": info
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn delete_user(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    let target_id = path.into_inner();
    log::info!("🗑️ DELETE /api/users/{} (by {})", target_id, user.user_id);

    if let Err(e) = ensure_owner(&target_id, &user.user_id) {
        return e.to_response();
    }

    match auth_service::delete_user_account(&db, &target_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "User deleted successfully"
        })),
        Err(e) => e.to_response(),
    }
}
