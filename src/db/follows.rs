use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::UserId;
use crate::db::users::User;
use crate::error::StoreResult;

/// A directed edge: `user_following_id` follows `user_being_followed_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Follow {
    pub user_being_followed_id: UserId,
    pub user_following_id: UserId,
}

/// Raw edge insert. Surfaces the composite-key uniqueness and foreign-key
/// constraints; the follow route goes through [`follow`] instead.
pub async fn insert(
    pool: &SqlitePool,
    user_being_followed_id: UserId,
    user_following_id: UserId,
) -> StoreResult<Follow> {
    let follow = sqlx::query_as::<_, Follow>(
        "INSERT INTO follows (user_being_followed_id, user_following_id)
         VALUES (?1, ?2)
         RETURNING *",
    )
    .bind(user_being_followed_id)
    .bind(user_following_id)
    .fetch_one(pool)
    .await?;

    Ok(follow)
}

/// Idempotent: re-following is a no-op.
pub async fn follow(
    pool: &SqlitePool,
    follower_id: UserId,
    followed_id: UserId,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO follows (user_being_followed_id, user_following_id)
         VALUES (?1, ?2)",
    )
    .bind(followed_id)
    .bind(follower_id)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn unfollow(
    pool: &SqlitePool,
    follower_id: UserId,
    followed_id: UserId,
) -> StoreResult<()> {
    sqlx::query(
        "DELETE FROM follows
         WHERE user_being_followed_id = ?1 AND user_following_id = ?2",
    )
    .bind(followed_id)
    .bind(follower_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Everyone `user_id` follows.
pub async fn following(pool: &SqlitePool, user_id: UserId) -> StoreResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN follows f ON f.user_being_followed_id = u.id
         WHERE f.user_following_id = ?1
         ORDER BY u.username",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Everyone following `user_id`.
pub async fn followers(pool: &SqlitePool, user_id: UserId) -> StoreResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         JOIN follows f ON f.user_following_id = u.id
         WHERE f.user_being_followed_id = ?1
         ORDER BY u.username",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
