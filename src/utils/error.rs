use actix_web::HttpResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Scryfall error: {0}")]
    Upstream(String),
}

impl AppError {
    pub fn database<E: std::fmt::Display>(e: E) -> Self {
        AppError::Database(e.to_string())
    }

    /// Mappe l'erreur vers la réponse HTTP standard `{success: false, error}`.
    pub fn to_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });

        match self {
            AppError::InvalidRequest(_) => HttpResponse::BadRequest().json(body),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            AppError::Forbidden => HttpResponse::Forbidden().json(body),
            AppError::NotFound(_) => HttpResponse::NotFound().json(body),
            AppError::Upstream(_) => HttpResponse::BadGateway().json(body),
            AppError::Database(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::InvalidRequest("bad".into()).to_response().status(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("no".into()).to_response().status(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("Deck".into()).to_response().status(),
            actix_web::http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Upstream("503".into()).to_response().status(),
            actix_web::http::StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(AppError::NotFound("Collection".into()).to_string(), "Collection not found");
    }
}
