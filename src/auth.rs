//! Password hashing and the session-backed current-user gate.

use argon2::Argon2;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Response;

use crate::db::{users, users::User, UserId};
use crate::error::AppError;
use crate::session::Session;
use crate::{views, AppState};

/// Session key holding the logged-in user's id.
pub const CURR_USER_KEY: &str = "curr_user";

pub fn hash_password(password: impl AsRef<[u8]>) -> Result<String, password_hash::Error> {
    let salt = password_hash::SaltString::generate(&mut rand::thread_rng());

    let hash =
        password_hash::PasswordHash::generate(Argon2::default(), password.as_ref(), &salt)?
            .to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = password_hash::PasswordHash::new(hash) else {
        return false;
    };

    parsed
        .verify_password(&[&Argon2::default()], password)
        .is_ok()
}

/// The user named by the session, if any. A stale or forged id that no
/// longer resolves to a row behaves as an anonymous session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(CurrentUser(None));
        };
        let Some(user_id) = session.get::<UserId>(CURR_USER_KEY) else {
            return Ok(CurrentUser(None));
        };

        let user = users::find(&state.pool, user_id).await?;
        Ok(CurrentUser(user))
    }
}

/// The uniform rejection for gated actions: flash and bounce to the root,
/// which shows the logged-out landing page for anonymous visitors.
pub fn unauthorized(session: &Session) -> Response {
    session.flash("danger", "Access unauthorized.");
    views::redirect("/")
}
