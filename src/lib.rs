//! Warbler: a server-rendered, Twitter-style microblogging site.
//!
//! Accounts, follows, short messages ("warbles"), likes, cookie-keyed
//! server-side sessions, and tera-rendered HTML over a SQLite database.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod session;
pub mod templates;
pub mod views;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub sessions: SessionStore,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.pool.clone()
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> SessionStore {
        state.sessions.clone()
    }
}
