use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo_types::User;

/// Request body for both sign-up and login.
///
/// Absent fields decode as empty so validation can name them.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserPayload {
    pub email: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub password: String,
    #[serde(rename = "profileimage")]
    pub profile_image: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(rename = "profileimage", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            profile_image: u.profile_image,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub users: Vec<PublicUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_wire_names_and_defaults_missing_fields() {
        let p: UserPayload =
            serde_json::from_str(r#"{"email":"a@b.co","firstname":"Ada"}"#).unwrap();
        assert_eq!(p.email, "a@b.co");
        assert_eq!(p.first_name, "Ada");
        assert_eq!(p.last_name, "");
        assert_eq!(p.password, "");
        assert!(p.profile_image.is_none());
    }

    #[test]
    fn public_user_has_no_password() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: 3,
            email: "test@example.com".into(),
            first_name: "T".into(),
            last_name: "E".into(),
            password_hash: "$argon2id$secret".into(),
            profile_image: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("\"firstname\":\"T\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("profileimage"));
    }
}
