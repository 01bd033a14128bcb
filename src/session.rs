//! Cookie-keyed server-side sessions.
//!
//! The cookie carries only an opaque id; all session state (the logged-in
//! user id, flash messages) lives in an in-process store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header, request::Parts, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;

pub const SESSION_COOKIE: &str = "warbler_session";

/// Expired sessions are swept once the store grows past this.
const CLEANUP_THRESHOLD: usize = 1024;

/// A one-shot notice drained the next time a page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone)]
struct SessionData {
    values: HashMap<String, serde_json::Value>,
    flashes: Vec<Flash>,
    expires_at: DateTime<Utc>,
}

impl SessionData {
    fn new(ttl: Duration) -> Self {
        Self {
            values: HashMap::new(),
            flashes: Vec::new(),
            expires_at: Utc::now() + ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }

    fn touch(&mut self, ttl: Duration) {
        self.expires_at = Utc::now() + ttl;
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    sessions: RwLock<HashMap<String, SessionData>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: RwLock::new(HashMap::new()),
                ttl,
            }),
        }
    }

    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.inner.sessions.write().unwrap();
        if sessions.len() >= CLEANUP_THRESHOLD {
            sessions.retain(|_, data| data.is_valid());
        }
        sessions.insert(id.clone(), SessionData::new(self.inner.ttl));
        id
    }

    /// Refreshes the expiry of a live session. Returns false for an unknown
    /// or expired id; expired entries are dropped on the way out.
    pub fn touch(&self, id: &str) -> bool {
        let mut sessions = self.inner.sessions.write().unwrap();
        match sessions.get_mut(id) {
            Some(data) if data.is_valid() => {
                data.touch(self.inner.ttl);
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    fn read<T>(&self, id: &str, f: impl FnOnce(&SessionData) -> T) -> Option<T> {
        let sessions = self.inner.sessions.read().unwrap();
        sessions.get(id).map(f)
    }

    fn write<T>(&self, id: &str, f: impl FnOnce(&mut SessionData) -> T) -> Option<T> {
        let mut sessions = self.inner.sessions.write().unwrap();
        sessions.get_mut(id).map(f)
    }
}

/// Handle to one request's session, inserted by [`middleware`].
#[derive(Clone)]
pub struct Session {
    store: SessionStore,
    id: String,
}

impl Session {
    pub fn new(store: SessionStore, id: String) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.store
            .read(&self.id, |data| data.values.get(key).cloned())
            .flatten()
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn insert<T: Serialize>(&self, key: &str, value: T) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.store.write(&self.id, |data| {
            data.values.insert(key.to_string(), value);
        });
        Ok(())
    }

    pub fn remove(&self, key: &str) {
        self.store.write(&self.id, |data| {
            data.values.remove(key);
        });
    }

    pub fn flash(&self, category: &str, message: impl Into<String>) {
        let flash = Flash {
            category: category.to_string(),
            message: message.into(),
        };
        self.store.write(&self.id, |data| data.flashes.push(flash));
    }

    /// Drains the pending flashes, Flask-style: each is shown once.
    pub fn take_flashes(&self) -> Vec<Flash> {
        self.store
            .write(&self.id, |data| std::mem::take(&mut data.flashes))
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Session>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "session middleware not installed",
        ))
    }
}

/// Resolves the session named by the request cookie, creating a fresh one
/// when the cookie is absent, unknown or expired. The cookie is only set on
/// responses that created a session.
pub async fn middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_id = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| {
            Cookie::split_parse(raw.to_owned())
                .filter_map(Result::ok)
                .find(|cookie| cookie.name() == SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
        });

    let (session_id, created) = match cookie_id {
        Some(id) if state.sessions.touch(&id) => (id, false),
        _ => (state.sessions.create(), true),
    };

    request
        .extensions_mut()
        .insert(Session::new(state.sessions.clone(), session_id.clone()));

    let mut response = next.run(request).await;

    if created {
        let cookie = Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}
