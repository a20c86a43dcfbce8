use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_AVATAR: &str = "https://static.vecteezy.com/system/resources/thumbnails/009/292/244/small/default-avatar-icon-of-social-media-user-vector.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User record in the database. The password hash never reaches a client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub avatar: String,
    pub is_frozen: bool,
    pub failed_attempts: i32,
    pub last_attempt: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Projection returned by the admin user listing.
#[derive(Debug, Serialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Find a user by email. Callers lowercase the email first.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, avatar, is_frozen,
                   failed_attempts, last_attempt, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, avatar, is_frozen,
                   failed_attempts, last_attempt, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new local user with a hashed password.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, role, avatar, is_frozen,
                      failed_attempts, last_attempt, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Create a user provisioned from a federated login, carrying the
    /// provider's avatar when it supplied one.
    pub async fn create_federated(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        avatar: Option<&str>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, avatar)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, avatar, is_frozen,
                      failed_attempts, last_attempt, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(avatar.unwrap_or(DEFAULT_AVATAR))
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Record a failed login in one atomic statement: increment the counter,
    /// and freeze the account in the same statement when the post-increment
    /// count reaches `max_attempts`. Returns the post-increment count, so
    /// concurrent failures cannot slip past the threshold.
    pub async fn record_failure(db: &PgPool, id: Uuid, max_attempts: i32) -> anyhow::Result<i32> {
        let (attempts,): (i32,) = sqlx::query_as(
            r#"
            UPDATE users
            SET failed_attempts = failed_attempts + 1,
                is_frozen = is_frozen OR failed_attempts + 1 >= $2,
                last_attempt = CASE
                    WHEN failed_attempts + 1 >= $2 THEN now()
                    ELSE last_attempt
                END,
                updated_at = now()
            WHERE id = $1
            RETURNING failed_attempts
            "#,
        )
        .bind(id)
        .bind(max_attempts)
        .fetch_one(db)
        .await?;
        Ok(attempts)
    }

    /// Lift an expired freeze and reset the counters.
    pub async fn clear_freeze(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET is_frozen = FALSE, failed_attempts = 0, last_attempt = NULL, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn reset_attempts(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET failed_attempts = 0, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// All users, optionally filtered by a case-insensitive substring match
    /// on name or email.
    pub async fn list_all(db: &PgPool, filter: Option<&str>) -> anyhow::Result<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, name, email, role, created_at, updated_at
            FROM users
            WHERE $1::text IS NULL
               OR name ILIKE '%' || $1 || '%'
               OR email ILIKE '%' || $1 || '%'
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter)
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
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
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
