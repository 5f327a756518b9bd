use crate::database::MongoDB;
use crate::models::{User, UserInfo, UserPreferences};
use crate::utils::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

// JWT Claims — single canonical layout, `sub` carries the user_id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub preferences: Option<UserPreferences>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

fn get_jwt_secret() -> String {
    // Vérifié au démarrage dans main : pas de secret par défaut public.
    std::env::var("JWT_SECRET").expect("JWT_SECRET must be set")
}

fn get_jwt_issuer() -> String {
    std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mtg-collection-service".to_string())
}

fn get_jwt_audience() -> String {
    std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mtg-collection-api".to_string())
}

fn get_jwt_expire_hours() -> i64 {
    std::env::var("JWT_EXPIRE_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(24)
}

// Generate JWT token
pub fn generate_jwt(user: &User) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + Duration::hours(get_jwt_expire_hours())).timestamp() as usize;

    let claims = Claims {
        sub: user.user_id.clone(),
        email: user.email.clone(),
        iat,
        exp,
        jti: Uuid::new_v4().to_string(),
        aud: get_jwt_audience(),
        iss: get_jwt_issuer(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(get_jwt_secret().as_ref()),
    )
    .map_err(|e| AppError::Unauthorized(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[get_jwt_audience()]);

    let mut issuers = HashSet::new();
    issuers.insert(get_jwt_issuer());
    validation.iss = Some(issuers);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(get_jwt_secret().as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Rejet des comptes désactivés — partagé par le login et la garde JWT.
pub fn ensure_active(user: &User) -> Result<(), AppError> {
    if !user.is_active {
        return Err(AppError::Unauthorized("Account is inactive".to_string()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = email.contains('@')
        && email.split('@').count() == 2
        && email.split('@').nth(1).is_some_and(|d| d.contains('.'));
    if !valid {
        return Err(AppError::InvalidRequest("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::InvalidRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.trim().chars().count();
    if !(3..=30).contains(&len) {
        return Err(AppError::InvalidRequest(
            "Username must be between 3 and 30 characters".to_string(),
        ));
    }
    Ok(())
}

// User registration
pub async fn register(db: &MongoDB, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
    validate_email(&request.email)?;
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    let collection = db.collection::<User>("users");

    let existing = collection
        .find_one(doc! { "email": &request.email })
        .await
        .map_err(AppError::database)?;
    if existing.is_some() {
        return Err(AppError::InvalidRequest("User already exists".to_string()));
    }

    let hashed_password = hash(&request.password, DEFAULT_COST)
        .map_err(|e| AppError::Database(format!("Failed to hash password: {}", e)))?;

    let new_user = User {
        _id: None,
        user_id: ObjectId::new().to_hex(),
        email: request.email.clone(),
        username: request.username.trim().to_string(),
        password: hashed_password,
        preferences: UserPreferences::default(),
        is_active: true,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
        last_login: Some(BsonDateTime::now()),
    };

    collection
        .insert_one(&new_user)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create user: {}", e)))?;

    let token = generate_jwt(&new_user)?;

    log::info!("✅ User registered successfully: {}", new_user.email);

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo::from(&new_user),
    })
}

// User login
pub async fn login(db: &MongoDB, request: &LoginRequest) -> Result<AuthResponse, AppError> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "email": &request.email })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify(&request.password, &user.password)
        .map_err(|e| AppError::Database(format!("Password verification error: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    ensure_active(&user)?;

    collection
        .update_one(
            doc! { "user_id": &user.user_id },
            doc! { "$set": { "last_login": BsonDateTime::now() } },
        )
        .await
        .map_err(AppError::database)?;

    let token = generate_jwt(&user)?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo::from(&user),
    })
}

// Get current user
pub async fn get_current_user(db: &MongoDB, user_id: &str) -> Result<UserInfo, AppError> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    Ok(UserInfo::from(&user))
}

// Update username and/or preferences
pub async fn update_profile(
    db: &MongoDB,
    user_id: &str,
    request: &UpdateProfileRequest,
) -> Result<UserInfo, AppError> {
    let collection = db.collection::<User>("users");

    let mut set = doc! { "updated_at": BsonDateTime::now() };
    if let Some(username) = &request.username {
        validate_username(username)?;
        set.insert("username", username.trim());
    }
    if let Some(preferences) = &request.preferences {
        let prefs_bson = mongodb::bson::to_bson(preferences).map_err(AppError::database)?;
        set.insert("preferences", prefs_bson);
    }

    let result = collection
        .update_one(doc! { "user_id": user_id }, doc! { "$set": set })
        .await
        .map_err(AppError::database)?;

    if result.matched_count == 0 {
        return Err(AppError::NotFound("User".to_string()));
    }

    get_current_user(db, user_id).await
}

// Change password (requires the current one)
pub async fn change_password(
    db: &MongoDB,
    user_id: &str,
    request: &ChangePasswordRequest,
) -> Result<(), AppError> {
    validate_password(&request.new_password)?;

    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": user_id })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let valid = verify(&request.current_password, &user.password)
        .map_err(|e| AppError::Database(format!("Password verification error: {}", e)))?;
    if !valid {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
    }

    let hashed = hash(&request.new_password, DEFAULT_COST)
        .map_err(|e| AppError::Database(format!("Failed to hash password: {}", e)))?;

    collection
        .update_one(
            doc! { "user_id": user_id },
            doc! { "$set": { "password": hashed, "updated_at": BsonDateTime::now() } },
        )
        .await
        .map_err(AppError::database)?;

    log::info!("🔑 Password changed for user: {}", user_id);
    Ok(())
}

/// Delete user account and all owned data.
/// Cascade explicite (pas de contrainte côté base) : collections puis decks.
pub async fn delete_user_account(db: &MongoDB, user_id: &str) -> Result<(), AppError> {
    log::info!("🗑️ Deleting account for user_id: {}", user_id);

    let users = db.collection::<User>("users");
    let delete_user_result = users
        .delete_one(doc! { "user_id": user_id })
        .await
        .map_err(AppError::database)?;

    if delete_user_result.deleted_count == 0 {
        log::warn!("⚠️ User {} not found in database", user_id);
        return Err(AppError::NotFound("User".to_string()));
    }

    let collections = db.collection::<mongodb::bson::Document>("collections");
    let deleted_collections = collections
        .delete_many(doc! { "owner_id": user_id })
        .await
        .map_err(AppError::database)?;
    log::info!(
        "✅ Deleted {} collections for user {}",
        deleted_collections.deleted_count,
        user_id
    );

    let decks = db.collection::<mongodb::bson::Document>("decks");
    let deleted_decks = decks
        .delete_many(doc! { "owner_id": user_id })
        .await
        .map_err(AppError::database)?;
    log::info!("✅ Deleted {} decks for user {}", deleted_decks.deleted_count, user_id);

    log::info!("🎉 Account and all data successfully deleted for user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_test_secret() {
        std::env::set_var("JWT_SECRET", "unit-test-secret");
    }

    fn test_user() -> User {
        User {
            _id: None,
            user_id: "64f000000000000000000001".into(),
            email: "a@b.com".into(),
            username: "planeswalker".into(),
            password: String::new(),
            preferences: UserPreferences::default(),
            is_active: true,
            created_at: None,
            updated_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        set_test_secret();
        let user = test_user();
        let token = generate_jwt(&user).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.email, "a@b.com");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        set_test_secret();
        let claims = Claims {
            sub: "x".into(),
            email: "a@b.com".into(),
            iat: (Utc::now() - Duration::hours(2)).timestamp() as usize,
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            aud: get_jwt_audience(),
            iss: get_jwt_issuer(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(get_jwt_secret().as_ref()),
        )
        .unwrap();

        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_wrongly_signed_token_is_rejected() {
        set_test_secret();
        let claims = Claims {
            sub: "x".into(),
            email: "a@b.com".into(),
            iat: Utc::now().timestamp() as usize,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            aud: get_jwt_audience(),
            iss: get_jwt_issuer(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )
        .unwrap();

        assert!(verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        set_test_secret();
        assert!(verify_token("not.a.jwt").is_err());
    }

    #[test]
    fn test_inactive_account_is_rejected() {
        let mut user = test_user();
        assert!(ensure_active(&user).is_ok());

        user.is_active = false;
        assert!(matches!(
            ensure_active(&user),
            Err(AppError::Unauthorized(ref m)) if m.contains("inactive")
        ));
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(validate_password("Passw0rd!").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_username_validation() {
        assert!(validate_username("gix").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }
}
