use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tera::Context;

use crate::auth::CurrentUser;
use crate::db::{likes, messages};
use crate::error::AppResult;
use crate::session::Session;
use crate::{templates, AppState};

const TIMELINE_LIMIT: i64 = 100;

// GET /
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
) -> AppResult<Response> {
    let Some(user) = current else {
        return Ok(templates::render("home_anon.html", &session, None, Context::new())?
            .into_response());
    };

    let messages = messages::timeline(&state.pool, user.id, TIMELINE_LIMIT).await?;
    let liked = likes::liked_message_ids(&state.pool, user.id).await?;

    let mut ctx = Context::new();
    ctx.insert("messages", &messages);
    ctx.insert("liked", &liked);
    Ok(templates::render("home.html", &session, Some(&user), ctx)?.into_response())
}
