use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::{MessageId, UserId};
use crate::error::StoreResult;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
}

/// A message row flattened with the author columns the cards render.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MessageWithAuthor {
    pub id: MessageId,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
    pub image_url: String,
}

const WITH_AUTHOR_COLUMNS: &str =
    "m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url";

/// Persists a new message. The timestamp is bound here rather than
/// defaulted by the database. Empty or over-long text and an unknown
/// `user_id` are rejected by the schema at insert time.
pub async fn create(pool: &SqlitePool, text: &str, user_id: UserId) -> StoreResult<Message> {
    let message = sqlx::query_as::<_, Message>(
        "INSERT INTO messages (text, timestamp, user_id)
         VALUES (?1, ?2, ?3)
         RETURNING *",
    )
    .bind(text)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(message)
}

pub async fn find(pool: &SqlitePool, message_id: MessageId) -> StoreResult<Option<Message>> {
    let message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = ?1")
        .bind(message_id)
        .fetch_optional(pool)
        .await?;

    Ok(message)
}

pub async fn find_with_author(
    pool: &SqlitePool,
    message_id: MessageId,
) -> StoreResult<Option<MessageWithAuthor>> {
    let message = sqlx::query_as::<_, MessageWithAuthor>(&format!(
        "SELECT {WITH_AUTHOR_COLUMNS}
         FROM messages m JOIN users u ON u.id = m.user_id
         WHERE m.id = ?1"
    ))
    .bind(message_id)
    .fetch_optional(pool)
    .await?;

    Ok(message)
}

/// Ownership is enforced at the route layer, not here.
pub async fn delete(pool: &SqlitePool, message_id: MessageId) -> StoreResult<()> {
    sqlx::query("DELETE FROM messages WHERE id = ?1")
        .bind(message_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// One user's messages, newest first.
pub async fn for_user(pool: &SqlitePool, user_id: UserId) -> StoreResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE user_id = ?1 ORDER BY timestamp DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

pub async fn for_user_with_author(
    pool: &SqlitePool,
    user_id: UserId,
) -> StoreResult<Vec<MessageWithAuthor>> {
    let messages = sqlx::query_as::<_, MessageWithAuthor>(&format!(
        "SELECT {WITH_AUTHOR_COLUMNS}
         FROM messages m JOIN users u ON u.id = m.user_id
         WHERE m.user_id = ?1
         ORDER BY m.timestamp DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// The logged-in home page: the user's own messages plus those of everyone
/// they follow, newest first.
pub async fn timeline(
    pool: &SqlitePool,
    user_id: UserId,
    limit: i64,
) -> StoreResult<Vec<MessageWithAuthor>> {
    let messages = sqlx::query_as::<_, MessageWithAuthor>(&format!(
        "SELECT {WITH_AUTHOR_COLUMNS}
         FROM messages m JOIN users u ON u.id = m.user_id
         WHERE m.user_id = ?1
            OR m.user_id IN (
                SELECT user_being_followed_id FROM follows WHERE user_following_id = ?1
            )
         ORDER BY m.timestamp DESC
         LIMIT ?2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}
