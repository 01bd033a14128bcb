use sqlx::SqlitePool;

use super::{MessageId, UserId};
use crate::db::messages::MessageWithAuthor;
use crate::error::StoreResult;

/// Likes or un-likes a message. Returns whether the message is liked
/// afterwards.
pub async fn toggle(
    pool: &SqlitePool,
    user_id: UserId,
    message_id: MessageId,
) -> StoreResult<bool> {
    let removed = sqlx::query("DELETE FROM likes WHERE user_id = ?1 AND message_id = ?2")
        .bind(user_id)
        .bind(message_id)
        .execute(pool)
        .await?
        .rows_affected();

    if removed > 0 {
        return Ok(false);
    }

    sqlx::query("INSERT INTO likes (user_id, message_id) VALUES (?1, ?2)")
        .bind(user_id)
        .bind(message_id)
        .execute(pool)
        .await?;

    Ok(true)
}

/// Ids of the messages the user liked; the timeline uses this to pick the
/// star state per card.
pub async fn liked_message_ids(pool: &SqlitePool, user_id: UserId) -> StoreResult<Vec<MessageId>> {
    let ids = sqlx::query_scalar("SELECT message_id FROM likes WHERE user_id = ?1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(ids)
}

pub async fn liked_messages(
    pool: &SqlitePool,
    user_id: UserId,
) -> StoreResult<Vec<MessageWithAuthor>> {
    let messages = sqlx::query_as::<_, MessageWithAuthor>(
        "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
         FROM likes l
         JOIN messages m ON m.id = l.message_id
         JOIN users u ON u.id = m.user_id
         WHERE l.user_id = ?1
         ORDER BY m.timestamp DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

pub async fn count_for_user(pool: &SqlitePool, user_id: UserId) -> StoreResult<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
