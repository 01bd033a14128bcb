use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::session::{self, Session};
use crate::{templates, views, AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // ==== HOME ==== //
        .route("/", get(views::home::index))
        // ==== AUTH ==== //
        .route("/signup", get(views::auth::signup_form).post(views::auth::signup))
        .route("/login", get(views::auth::login_form).post(views::auth::login))
        .route("/logout", get(views::auth::logout))
        // ==== USERS ==== //
        .route("/users", get(views::users::index))
        .route("/users/profile", get(views::users::edit_form).post(views::users::edit))
        .route("/users/delete", post(views::users::delete))
        .route("/users/follow/{id}", post(views::users::follow))
        .route("/users/stop-following/{id}", post(views::users::stop_following))
        .route("/users/{id}", get(views::users::show))
        .route("/users/{id}/following", get(views::users::following))
        .route("/users/{id}/followers", get(views::users::followers))
        .route("/users/{id}/likes", get(views::users::liked_warbles))
        // ==== MESSAGES ==== //
        .route(
            "/messages/new",
            get(views::messages::new_form).post(views::messages::create),
        )
        .route("/messages/{id}", get(views::messages::show))
        .route("/messages/{id}/delete", post(views::messages::delete))
        .route("/messages/{id}/like", post(views::messages::like))
        .fallback(handler_404)
        .layer(middleware::from_fn_with_state(state.clone(), session::middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

// Unmatched paths get the full 404 page, with the nav for the session.
async fn handler_404(session: Session, CurrentUser(current): CurrentUser) -> AppResult<Response> {
    let page = templates::render("404.html", &session, current.as_ref(), tera::Context::new())?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}
