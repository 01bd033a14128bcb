pub mod follows;
pub mod likes;
pub mod messages;
pub mod users;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub type UserId = i64;
pub type MessageId = i64;

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // A ":memory:" database exists per connection, so it must not be
    // spread across a pool.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn prepare(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../sql/schema.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

#[allow(dead_code)]
pub async fn reset(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../sql/down.sql"))
        .execute(pool)
        .await?;
    sqlx::raw_sql(include_str!("../sql/schema.sql"))
        .execute(pool)
        .await?;
    Ok(())
}
