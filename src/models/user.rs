use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime as BsonDateTime;
use serde::{Deserialize, Serialize};

/// User account (collection: users).
/// `user_id` is the primary identifier used everywhere (ObjectId hex),
/// matching the `sub` claim of issued JWTs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,
    pub user_id: String,
    pub email: String,
    pub username: String,
    /// bcrypt hash — exposed to clients only through `UserInfo`, never raw.
    pub password: String,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
    pub last_login: Option<BsonDateTime>,
}

fn default_is_active() -> bool {
    true
}

/// Préférences utilisateur (l'application est localisée en français).
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct UserPreferences {
    #[serde(default = "default_language")]
    pub preferred_language: String,
    #[serde(default = "default_language")]
    pub default_card_language: String,
}

fn default_language() -> String {
    "fr".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            preferred_language: default_language(),
            default_card_language: default_language(),
        }
    }
}

/// Sanitized view returned by auth/user endpoints (no password field).
#[derive(Debug, Serialize, Deserialize, Clone, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub username: String,
    pub preferences: UserPreferences,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        UserInfo {
            id: user.user_id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            preferences: user.preferences.clone(),
        }
    }
}

/// Public profile visible to other users: no email, no preferences.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PublicProfile {
    pub id: String,
    pub username: String,
    pub member_since: Option<String>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        PublicProfile {
            id: user.user_id.clone(),
            username: user.username.clone(),
            member_since: user.created_at.map(|d| d.try_to_rfc3339_string().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_info_has_no_password() {
        let user = User {
            _id: None,
            user_id: "abc".into(),
            email: "a@b.com".into(),
            username: "planeswalker".into(),
            password: "$2b$12$hash".into(),
            preferences: UserPreferences::default(),
            is_active: true,
            created_at: None,
            updated_at: None,
            last_login: None,
        };

        let info = UserInfo::from(&user);
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "a@b.com");
    }

    #[test]
    fn test_default_preferences_are_french() {
        let prefs = UserPreferences::default();
        assert_eq!(prefs.preferred_language, "fr");
        assert_eq!(prefs.default_card_language, "fr");
    }
}
