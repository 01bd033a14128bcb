#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use warbler::auth::CURR_USER_KEY;
use warbler::db::users::{self, NewUser, User};
use warbler::db::{self, UserId};
use warbler::session::{Session, SessionStore, SESSION_COOKIE};
use warbler::{routes, AppState};

/// One fully wired application over a fresh in-memory database, driven
/// in-process through the router.
pub struct TestApp {
    pub pool: SqlitePool,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        let pool = db::connect("sqlite::memory:")
            .await
            .expect("connect test database");
        db::prepare(&pool).await.expect("create schema");

        let state = AppState {
            pool: pool.clone(),
            sessions: SessionStore::new(chrono::Duration::hours(2)),
        };
        let router = routes::build_router(state.clone());

        TestApp { pool, state, router }
    }

    pub async fn signup_user(&self, username: &str, email: &str, password: &str) -> User {
        let new_user = NewUser::signup(username, email, password, None).unwrap();
        users::insert(&self.pool, &new_user).await.unwrap()
    }

    /// Forges a logged-in session the way the original suite writes the
    /// user id straight into the session, and returns the Cookie header
    /// value to send. The id is not checked here, so a stale/fake id can
    /// be planted too.
    pub fn login_as(&self, user_id: UserId) -> String {
        let session_id = self.state.sessions.create();
        let session = Session::new(self.state.sessions.clone(), session_id.clone());
        session.insert(CURR_USER_KEY, user_id).unwrap();
        format!("{SESSION_COOKIE}={session_id}")
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        self.send(request, cookie).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let body = serde_urlencoded::to_string(form).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request, cookie).await
    }

    /// GET following redirects, like the Flask client's
    /// `follow_redirects=True`: returns the final status and body.
    pub async fn get_following(&self, path: &str, cookie: Option<&str>) -> (StatusCode, String) {
        self.request_following("GET", path, None, cookie).await
    }

    pub async fn post_form_following(
        &self,
        path: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> (StatusCode, String) {
        self.request_following("POST", path, Some(form), cookie).await
    }

    async fn send(&self, mut request: Request<Body>, cookie: Option<&str>) -> Response<Body> {
        if let Some(cookie) = cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn request_following(
        &self,
        method: &str,
        path: &str,
        form: Option<&[(&str, &str)]>,
        cookie: Option<&str>,
    ) -> (StatusCode, String) {
        let mut cookie = cookie.map(str::to_owned);
        let mut method = method.to_string();
        let mut path = path.to_string();
        let mut form = form;

        loop {
            let mut builder = Request::builder().method(method.as_str()).uri(path.as_str());
            if let Some(value) = &cookie {
                builder = builder.header(header::COOKIE, value.as_str());
            }
            let request = match form {
                Some(fields) => builder
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();

            // Carry a freshly issued session cookie into the next hop, the
            // way a browser would; the flash lives in that session.
            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let raw = set_cookie.to_str().unwrap();
                cookie = Some(raw.split(';').next().unwrap().to_string());
            }

            if response.status().is_redirection() {
                path = response
                    .headers()
                    .get(header::LOCATION)
                    .expect("redirect without Location")
                    .to_str()
                    .unwrap()
                    .to_string();
                method = "GET".to_string();
                form = None;
                continue;
            }

            let status = response.status();
            let body = body_text(response).await;
            return (status, body);
        }
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
