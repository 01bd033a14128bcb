use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use tera::Context;
use validator::Validate;

use crate::auth::{self, CurrentUser, CURR_USER_KEY};
use crate::db::users::{
    self, User, UserChanges, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL,
};
use crate::db::{follows, likes, UserId};
use crate::error::{AppResult, StoreError};
use crate::session::Session;
use crate::views::{redirect, validation_messages};
use crate::{templates, AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 30, message = "Username can't be blank"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "E-mail can't be blank"),
        email(message = "Invalid e-mail address")
    )]
    pub email: String,

    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub header_image_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: String,

    pub password: String,
}

// GET /users
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Query(params): Query<SearchQuery>,
) -> AppResult<Response> {
    let users = users::list(&state.pool, params.q.as_deref()).await?;

    let mut ctx = Context::new();
    ctx.insert("users", &users);
    ctx.insert("query", &params.q.unwrap_or_default());
    Ok(templates::render("users/index.html", &session, current.as_ref(), ctx)?.into_response())
}

// GET /users/{id}
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<UserId>,
) -> AppResult<Response> {
    let Some(user) = users::find(&state.pool, user_id).await? else {
        return Err(StoreError::NotFound.into());
    };
    let messages = users::messages_with_author(&state.pool, user_id).await?;
    let stats = users::stats(&state.pool, user_id).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("messages", &messages);
    ctx.insert("stats", &stats);
    Ok(templates::render("users/show.html", &session, current.as_ref(), ctx)?.into_response())
}

// GET /users/{id}/following
pub async fn following(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<UserId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    let Some(user) = users::find(&state.pool, user_id).await? else {
        return Err(StoreError::NotFound.into());
    };
    let follow_list = follows::following(&state.pool, user_id).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("follow_list", &follow_list);
    Ok(templates::render("users/following.html", &session, Some(&me), ctx)?.into_response())
}

// GET /users/{id}/followers
pub async fn followers(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<UserId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    let Some(user) = users::find(&state.pool, user_id).await? else {
        return Err(StoreError::NotFound.into());
    };
    let follow_list = follows::followers(&state.pool, user_id).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("follow_list", &follow_list);
    Ok(templates::render("users/followers.html", &session, Some(&me), ctx)?.into_response())
}

// GET /users/{id}/likes
pub async fn liked_warbles(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<UserId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    let Some(user) = users::find(&state.pool, user_id).await? else {
        return Err(StoreError::NotFound.into());
    };
    let messages = likes::liked_messages(&state.pool, user_id).await?;
    let like_count = likes::count_for_user(&state.pool, user_id).await?;

    let mut ctx = Context::new();
    ctx.insert("user", &user);
    ctx.insert("messages", &messages);
    ctx.insert("like_count", &like_count);
    Ok(templates::render("users/likes.html", &session, Some(&me), ctx)?.into_response())
}

// POST /users/follow/{id}
pub async fn follow(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(follow_id): Path<UserId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    if follow_id == me.id {
        session.flash("danger", "You can't follow yourself.");
        return Ok(redirect("/"));
    }
    if users::find(&state.pool, follow_id).await?.is_none() {
        return Err(StoreError::NotFound.into());
    }

    follows::follow(&state.pool, me.id, follow_id).await?;
    Ok(redirect(&format!("/users/{}/following", me.id)))
}

// POST /users/stop-following/{id}
pub async fn stop_following(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Path(follow_id): Path<UserId>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    if users::find(&state.pool, follow_id).await?.is_none() {
        return Err(StoreError::NotFound.into());
    }

    follows::unfollow(&state.pool, me.id, follow_id).await?;
    Ok(redirect(&format!("/users/{}/following", me.id)))
}

fn render_edit(session: &Session, me: &User, form: &ProfileForm, errors: &[String]) -> AppResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(templates::render("users/edit.html", session, Some(me), ctx)?.into_response())
}

// GET /users/profile
pub async fn edit_form(session: Session, CurrentUser(current): CurrentUser) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };

    let form = ProfileForm {
        username: me.username.clone(),
        email: me.email.clone(),
        image_url: me.image_url.clone(),
        header_image_url: me.header_image_url.clone(),
        bio: me.bio.clone().unwrap_or_default(),
        location: me.location.clone().unwrap_or_default(),
        password: String::new(),
    };
    render_edit(&session, &me, &form, &[])
}

// POST /users/profile
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };
    if let Err(errors) = form.validate() {
        return render_edit(&session, &me, &form, &validation_messages(&errors));
    }
    if !auth::verify_password(&me.password, &form.password) {
        session.flash("danger", "Wrong password, please try again.");
        return render_edit(&session, &me, &form, &[]);
    }

    let changes = UserChanges {
        username: form.username.clone(),
        email: form.email.clone(),
        image_url: if form.image_url.is_empty() {
            DEFAULT_IMAGE_URL.to_string()
        } else {
            form.image_url.clone()
        },
        header_image_url: if form.header_image_url.is_empty() {
            DEFAULT_HEADER_IMAGE_URL.to_string()
        } else {
            form.header_image_url.clone()
        },
        bio: (!form.bio.is_empty()).then(|| form.bio.clone()),
        location: (!form.location.is_empty()).then(|| form.location.clone()),
    };

    let updated = users::update(&state.pool, me.id, &changes).await?;
    Ok(redirect(&format!("/users/{}", updated.id)))
}

// POST /users/delete
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    CurrentUser(current): CurrentUser,
) -> AppResult<Response> {
    let Some(me) = current else {
        return Ok(auth::unauthorized(&session));
    };

    session.remove(CURR_USER_KEY);
    users::delete(&state.pool, me.id).await?;
    Ok(redirect("/signup"))
}
