use serde::{Deserialize, Serialize};

use crate::auth::repo::{Role, User, UserSummary};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Query string for the Google login callback.
#[derive(Debug, Deserialize)]
pub struct GoogleLoginQuery {
    pub code: String,
}

/// Admin listing filter. The client sends its search box content as `title`
/// on the users route too; it matches name or email.
#[derive(Debug, Deserialize)]
pub struct UserFilter {
    pub title: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            role: user.role,
        }
    }
}

/// Response returned after register, login or google-login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: PublicUser,
    pub token: String,
    pub message: String,
}

impl AuthResponse {
    pub fn new(user: &User, token: String, message: &str) -> Self {
        Self {
            success: true,
            user: PublicUser::from(user),
            token,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::DEFAULT_AVATAR;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "hash".into(),
            role: Role::User,
            avatar: DEFAULT_AVATAR.into(),
            is_frozen: false,
            failed_attempts: 0,
            last_attempt: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn auth_response_shape() {
        let user = sample_user();
        let json =
            serde_json::to_value(AuthResponse::new(&user, "tok".into(), "User logged in")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["token"], "tok");
        assert_eq!(json["user"]["email"], "ada@example.com");
        assert_eq!(json["user"]["role"], "user");
        assert!(json["user"].get("password_hash").is_none());
        assert!(json["user"].get("id").is_none());
    }

    #[test]
    fn missing_register_fields_default_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
    }
}
