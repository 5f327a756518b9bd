use crate::database::MongoDB;
use crate::middleware::auth::current_user;
use crate::services::stats_service;
use actix_web::{web, HttpRequest, HttpResponse};

#[utoipa::path(
    get,
    path = "/api/stats/dashboard",
    tag = "Stats",
    responses(
        (status = 200, description = "Aggregated collection and deck statistics"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn dashboard(db: web::Data<MongoDB>, req: HttpRequest) -> HttpResponse {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return e.to_response(),
    };
    log::info!("📊 GET /api/stats/dashboard - {}", user.user_id);

    match stats_service::dashboard(&db, &user.user_id).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}
