use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// One saved conversation turn: the user's message and the reply shown
/// for it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub reply: String,
    pub created_at: OffsetDateTime,
}

impl ChatMessage {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        message: &str,
        reply: &str,
    ) -> sqlx::Result<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (user_id, message, reply)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, message, reply, created_at
            "#,
        )
        .bind(user_id)
        .bind(message)
        .bind(reply)
        .fetch_one(db)
        .await
    }

    /// All records owned by the user, most recent first.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, user_id, message, reply, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Delete a record only if it is owned by `user_id`. Returns whether
    /// a row was removed; an absent record and a foreign-owned record
    /// are indistinguishable here.
    pub async fn delete_owned(db: &PgPool, user_id: Uuid, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM chat_messages
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
