use crate::database::MongoDB;
use crate::middleware::auth::current_user;
use crate::services::auth_service;
use crate::services::auth_service::{AuthResponse, LoginRequest, RegisterRequest};
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = AuthResponse),
        (status = 400, description = "Invalid request or user already exists")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /api/auth/register - email: {}", request.email);

    match auth_service::register(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Registration successful: {}", request.email);
            HttpResponse::Created().json(response)
        }
        Err(e) => {
            log::warn!("❌ Registration failed: {} - {}", request.email, e);
            e.to_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(db: web::Data<MongoDB>, request: web::Json<LoginRequest>) -> HttpResponse {
    log::info!("🔐 POST /api/auth/login - email: {}", request.email);

    match auth_service::login(&db, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log::warn!("❌ Login failed: {} - {}", request.email, e);
            e.to_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current user information"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("👤 GET /api/auth/me - {}", user.user_id);

    match auth_service::get_current_user(&db, &user.user_id).await {
        Ok(info) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": info
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn update_profile(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<auth_service::UpdateProfileRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("✏️ PUT /api/auth/profile - {}", user.user_id);

    match auth_service::update_profile(&db, &user.user_id, &request).await {
        Ok(info) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "user": info
        })),
        Err(e) => e.to_response(),
    }
}

pub async fn change_password(
    db: web::Data<MongoDB>,
    req: HttpRequest,
    request: web::Json<auth_service::ChangePasswordRequest>,
) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("🔑 PUT /api/auth/password - {}", user.user_id);

    match auth_service::change_password(&db, &user.user_id, &request).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Password updated"
        })),
        Err(e) => e.to_response(),
    }
}

/// Stateless: the JWT lives client-side, logout is an acknowledgement.
pub async fn logout(req: HttpRequest) -> HttpResponse {
    if let Ok(user) = current_user(&req) {
        log::info!("👋 POST /api/auth/logout - {} ({})", user.user_id, user.email);
    }
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Logged out"
    }))
}

pub async fn delete_account(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("🗑️ DELETE /api/auth/account - {} ({})", user.user_id, user.email);

    match auth_service::delete_user_account(&db, &user.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Account deleted successfully"
        })),
        Err(e) => e.to_response(),
    }
}
