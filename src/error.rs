use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sqlx::error::ErrorKind;

use crate::templates;

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Store-level failures. Constraint rejections from the database are
/// classified into `Integrity` so callers can tell "the write violated the
/// schema" apart from "the database broke".
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Password must be non-empty.")]
    EmptyPassword,

    #[error("record not found")]
    NotFound,

    #[error("database constraint violated: {0}")]
    Integrity(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] password_hash::Error),
}

impl StoreError {
    fn database_kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Integrity(sqlx::Error::Database(err))
            | StoreError::Sqlx(sqlx::Error::Database(err)) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn is_integrity(&self) -> bool {
        matches!(self, StoreError::Integrity(_))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self.database_kind(), Some(ErrorKind::UniqueViolation))
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self.database_kind(), Some(ErrorKind::ForeignKeyViolation))
    }

    /// Any failure raised by the database itself, constraint or otherwise.
    pub fn is_database_error(&self) -> bool {
        matches!(self, StoreError::Integrity(_) | StoreError::Sqlx(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if !matches!(db.kind(), ErrorKind::Other) => {
                StoreError::Integrity(sqlx::Error::Database(db))
            }
            err => StoreError::Sqlx(err),
        }
    }
}

/// Route-level failures. Authorization violations never end up here: the
/// handlers turn those into a flash plus a redirect.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid form input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    #[error("session serialization failed: {0}")]
    Session(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Store(StoreError::NotFound) => {
                let page = templates::render_bare("404.html")
                    .unwrap_or_else(|_| "Page not found.".to_string());
                (StatusCode::NOT_FOUND, Html(page)).into_response()
            }
            AppError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, errors.to_string()).into_response()
            }
            err => {
                tracing::error!(error = ?err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
