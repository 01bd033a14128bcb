use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::UserId;
use crate::auth;
use crate::db::messages::{Message, MessageWithAuthor};
use crate::error::{StoreError, StoreResult};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.png";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.jpg";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// An account that has been through signup but not yet persisted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: String,
}

impl NewUser {
    /// Hashes the password and builds the row to insert. An empty password
    /// is rejected here, before anything touches the database.
    pub fn signup(
        username: &str,
        email: &str,
        password: &str,
        image_url: Option<String>,
    ) -> StoreResult<NewUser> {
        if password.is_empty() {
            return Err(StoreError::EmptyPassword);
        }

        Ok(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: auth::hash_password(password)?,
            image_url: image_url.unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct UserStats {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}

pub async fn insert(pool: &SqlitePool, new_user: &NewUser) -> StoreResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, password, image_url)
         VALUES (?1, ?2, ?3, ?4)
         RETURNING *",
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.password)
    .bind(&new_user.image_url)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find(pool: &SqlitePool, user_id: UserId) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// User directory, optionally filtered by username substring.
pub async fn list(pool: &SqlitePool, query: Option<&str>) -> StoreResult<Vec<User>> {
    let users = match query {
        Some(q) => {
            sqlx::query_as::<_, User>(
                "SELECT * FROM users WHERE username LIKE ?1 ORDER BY username",
            )
            .bind(format!("%{q}%"))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
                .fetch_all(pool)
                .await?
        }
    };

    Ok(users)
}

/// Looks the user up by username and verifies the password against the
/// stored hash. Unknown username and wrong password are indistinguishable
/// to the caller.
pub async fn authenticate(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> StoreResult<Option<User>> {
    let Some(user) = find_by_username(pool, username).await? else {
        return Ok(None);
    };

    Ok(auth::verify_password(&user.password, password).then_some(user))
}

pub async fn update(pool: &SqlitePool, user_id: UserId, changes: &UserChanges) -> StoreResult<User> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET username = ?1, email = ?2, image_url = ?3, header_image_url = ?4,
             bio = ?5, location = ?6
         WHERE id = ?7
         RETURNING *",
    )
    .bind(&changes.username)
    .bind(&changes.email)
    .bind(&changes.image_url)
    .bind(&changes.header_image_url)
    .bind(&changes.bio)
    .bind(&changes.location)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Deletes the account. Messages, follows and likes go with it.
pub async fn delete(pool: &SqlitePool, user_id: UserId) -> StoreResult<()> {
    sqlx::query("DELETE FROM users WHERE id = ?1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn is_following(
    pool: &SqlitePool,
    user_id: UserId,
    other_id: UserId,
) -> StoreResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(
             SELECT 1 FROM follows
             WHERE user_following_id = ?1 AND user_being_followed_id = ?2
         )",
    )
    .bind(user_id)
    .bind(other_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

pub async fn is_followed_by(
    pool: &SqlitePool,
    user_id: UserId,
    other_id: UserId,
) -> StoreResult<bool> {
    is_following(pool, other_id, user_id).await
}

pub async fn stats(pool: &SqlitePool, user_id: UserId) -> StoreResult<UserStats> {
    let stats = sqlx::query_as::<_, UserStats>(
        "SELECT
             (SELECT COUNT(*) FROM messages WHERE user_id = ?1) AS messages,
             (SELECT COUNT(*) FROM follows WHERE user_following_id = ?1) AS following,
             (SELECT COUNT(*) FROM follows WHERE user_being_followed_id = ?1) AS followers,
             (SELECT COUNT(*) FROM likes WHERE user_id = ?1) AS likes",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// A user's own messages, newest first.
pub async fn messages(pool: &SqlitePool, user_id: UserId) -> StoreResult<Vec<Message>> {
    crate::db::messages::for_user(pool, user_id).await
}

/// Same, joined with the author columns the message cards render.
pub async fn messages_with_author(
    pool: &SqlitePool,
    user_id: UserId,
) -> StoreResult<Vec<MessageWithAuthor>> {
    crate::db::messages::for_user_with_author(pool, user_id).await
}
