pub mod auth;
pub mod home;
pub mod messages;
pub mod users;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// 302 redirect. `axum::response::Redirect` only offers 303/307/308, and
/// the browser-facing flows here are plain FOUND bounces.
pub fn redirect(to: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, to)]).into_response()
}

/// Flattens validator output into the strings the form pages print.
pub(crate) fn validation_messages(errors: &validator::ValidationErrors) -> Vec<String> {
    errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field}: {}", error.code),
            })
        })
        .collect()
}
