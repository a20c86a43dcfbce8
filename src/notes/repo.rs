use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Note record in the database. `user_id` is a weak reference; deleting a
/// user leaves their notes in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Owner-scoped listing projection.
#[derive(Debug, Serialize, FromRow)]
pub struct NoteSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Admin listing row joined with the owner's name. The owner may be gone.
#[derive(Debug, Serialize, FromRow)]
pub struct AdminNote {
    pub id: Uuid,
    pub title: String,
    pub name: Option<String>,
    pub description: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Note {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO notes (user_id, title, description) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(title)
            .bind(description)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Notes owned by `user_id`, optionally filtered by a case-insensitive
    /// substring match on the title.
    pub async fn list_by_owner(
        db: &PgPool,
        user_id: Uuid,
        title: Option<&str>,
    ) -> anyhow::Result<Vec<NoteSummary>> {
        let notes = sqlx::query_as::<_, NoteSummary>(
            r#"
            SELECT id, title, description, created_at, updated_at
            FROM notes
            WHERE user_id = $1
              AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_all(db)
        .await?;
        Ok(notes)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, description, created_at, updated_at
            FROM notes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(note)
    }

    /// Owner-scoped update. Returns false when no note matches {id, owner},
    /// so a cross-owner attempt surfaces as not-found instead of a silent
    /// no-op success.
    pub async fn update_owned(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        title: &str,
        description: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE notes
            SET title = $3, description = $4, updated_at = now()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(title)
        .bind(description)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Owner-scoped delete. Returns false when no note matches {id, owner}.
    pub async fn delete_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All notes across owners with each owner's name, optionally filtered
    /// by a case-insensitive substring match on the title.
    pub async fn list_all(db: &PgPool, title: Option<&str>) -> anyhow::Result<Vec<AdminNote>> {
        let notes = sqlx::query_as::<_, AdminNote>(
            r#"
            SELECT n.id, n.title, u.name, n.description, n.created_at, n.updated_at
            FROM notes n
            LEFT JOIN users u ON u.id = n.user_id
            WHERE $1::text IS NULL OR n.title ILIKE '%' || $1 || '%'
            ORDER BY n.created_at DESC
            "#,
        )
        .bind(title)
        .fetch_all(db)
        .await?;
        Ok(notes)
    }
}
