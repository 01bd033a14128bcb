use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use tera::Context;
use validator::Validate;

use crate::auth::{self, CurrentUser};
use crate::db::users::User;
use crate::db::{likes, messages, MessageId};
use crate::error::{AppResult, StoreError};
use crate::session::Session;
use crate::views::{redirect, validation_messages};
use crate::{templates, AppState};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct MessageForm {
    #[validate(length(min = 1, max = 140, message = "Message can't be blank"))]
    pub text: String,
}

fn render_new(session: &Session, me: &User, form: &MessageForm, errors: &[String]) -> AppResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(templates::render("messages/new.html", session, Some(me), ctx)?.into_response())
}

// GET /messages/new
pub async fn new_form(session: Session, CurrentUser(current): CurrentUser) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    render_new(&session, &me, &MessageForm::default(), &[])
}

// POST /messages/new
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Form(form): Form<MessageForm>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    if let Err(errors) = form.validate() {
        return render_new(&session, &me, &form, &validation_messages(&errors));
    }

    messages::create(&state.pool, &form.text, me.id).await?;
    Ok(redirect(&format!("/users/{}", me.id)))
}

// GET /messages/{id}
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(message_id): Path<MessageId>,
) -> AppResult<Response> {
    let Some(message) = messages::find_with_author(&state.pool, message_id).await? else {
        return Err(StoreError::NotFound.into());
    };

    let mut ctx = Context::new();
    ctx.insert("message", &message);
    Ok(templates::render("messages/show.html", &session, current.as_ref(), ctx)?.into_response())
}

// POST /messages/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(message_id): Path<MessageId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    let Some(message) = messages::find(&state.pool, message_id).await? else {
        return Err(StoreError::NotFound.into());
    };
    if message.user_id != me.id {
        return Ok(auth::unauthorized(&session));
    }

    messages::delete(&state.pool, message_id).await?;
    Ok(redirect(&format!("/users/{}", me.id)))
}

// POST /messages/{id}/like
pub async fn like(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(message_id): Path<MessageId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    let Some(message) = messages::find(&state.pool, message_id).await? else {
        return Err(StoreError::NotFound.into());
    };
    if message.user_id == me.id {
        session.flash("danger", "You can't like your own warble.");
        return Ok(redirect("/"));
    }

    likes::toggle(&state.pool, me.id, message_id).await?;
    Ok(redirect("/"))
}
