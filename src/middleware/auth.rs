use crate::database::MongoDB;
use crate::models::User;
use crate::services::auth_service;
use crate::utils::AppError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    web, Error, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use mongodb::bson::doc;
use std::future::{ready, Ready};
use std::rc::Rc;

/// Identity attached to the request once the guard has passed.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Reads the authenticated identity out of the request extensions.
/// Only meaningful behind `AuthMiddleware`.
pub fn current_user(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    req.extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Garde JWT : token absent → 401 ; token invalide/expiré → 401 ;
/// utilisateur inconnu ou inactif → 401 ; sinon la requête continue avec
/// l'identité en extension.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service: Rc::new(service) }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

fn unauthorized(message: &str) -> Error {
    let err = AppError::Unauthorized(message.to_string());
    InternalError::from_response(message.to_string(), err.to_response()).into()
}

/// Décision pure sur le compte résolu : inconnu ou inactif → 401.
fn resolve_account(user: Option<User>) -> Result<User, AppError> {
    let user = user.ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    auth_service::ensure_active(&user)?;
    Ok(user)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.to_string());

        Box::pin(async move {
            let Some(token) = token else {
                return Err(unauthorized("Missing authorization token"));
            };

            let claims = match auth_service::verify_token(&token) {
                Ok(claims) => claims,
                Err(e) => return Err(unauthorized(&e.to_string())),
            };

            let Some(db) = req.app_data::<web::Data<MongoDB>>() else {
                return Err(unauthorized("Authentication unavailable"));
            };

            let found = db
                .collection::<User>("users")
                .find_one(doc! { "user_id": &claims.sub })
                .await
                .map_err(|e| unauthorized(&format!("Database error: {}", e)))?;

            let user = match resolve_account(found) {
                Ok(user) => user,
                Err(e) => return Err(unauthorized(&e.to_string())),
            };

            req.extensions_mut().insert(AuthenticatedUser {
                user_id: user.user_id,
                email: user.email,
            });

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserPreferences;
    use actix_web::test::TestRequest;

    fn account(active: bool) -> User {
        User {
            _id: None,
            user_id: "u1".into(),
            email: "a@b.com".into(),
            username: "jace".into(),
            password: "hash".into(),
            preferences: UserPreferences::default(),
            is_active: active,
            created_at: None,
            updated_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_resolve_account_missing_user() {
        assert!(matches!(resolve_account(None), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_resolve_account_inactive_user() {
        assert!(matches!(
            resolve_account(Some(account(false))),
            Err(AppError::Unauthorized(ref m)) if m.contains("inactive")
        ));
    }

    #[test]
    fn test_resolve_account_active_user() {
        let user = resolve_account(Some(account(true))).unwrap();
        assert_eq!(user.user_id, "u1");
    }

    #[test]
    fn test_current_user_requires_guard() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(current_user(&req), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_current_user_reads_extension() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthenticatedUser {
            user_id: "u1".into(),
            email: "a@b.com".into(),
        });

        let user = current_user(&req).unwrap();
        assert_eq!(user.user_id, "u1");
        assert_eq!(user.email, "a@b.com");
    }
}
