use crate::database::MongoDB;
use crate::models::{PublicProfile, User, UserInfo};
use crate::utils::AppError;
use mongodb::bson::doc;
use serde::Serialize;

/// Profile view: full info for the requesting user, public subset otherwise.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Own(UserInfo),
    Public(PublicProfile),
}

pub async fn get_profile(
    db: &MongoDB,
    target_id: &str,
    requester_id: &str,
) -> Result<ProfileView, AppError> {
    let collection = db.collection::<User>("users");

    let user = collection
        .find_one(doc! { "user_id": target_id })
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if user.user_id == requester_id {
        Ok(ProfileView::Own(UserInfo::from(&user)))
    } else {
        Ok(ProfileView::Public(PublicProfile::from(&user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserPreferences;

    #[test]
    fn test_public_view_hides_email() {
        let user = User {
            _id: None,
            user_id: "u1".into(),
            email: "secret@b.com".into(),
            username: "jace".into(),
            password: "hash".into(),
            preferences: UserPreferences::default(),
            is_active: true,
            created_at: None,
            updated_at: None,
            last_login: None,
        };

        let view = ProfileView::Public(PublicProfile::from(&user));
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["username"], "jace");
    }
}
