mod common;

use axum::http::StatusCode;
use common::TestApp;
use warbler::db::users;

#[tokio::test]
async fn signup_creates_the_account_and_logs_in() {
    let app = TestApp::spawn().await;

    let (status, html) = app
        .post_form_following(
            "/signup",
            &[
                ("username", "Test"),
                ("email", "test@gmail.com"),
                ("password", "secret123"),
                ("image_url", ""),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<a href="/logout">Log out</a>"#));

    let user = users::find_by_username(&app.pool, "Test")
        .await
        .unwrap()
        .expect("account was created");
    assert_eq!(user.email, "test@gmail.com");
    assert_ne!(user.password, "secret123");

    // The stored hash verifies against the original plaintext.
    assert!(users::authenticate(&app.pool, "Test", "secret123")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn signup_with_a_taken_username_rerenders_with_a_notice() {
    let app = TestApp::spawn().await;
    app.signup_user("Test", "first@test.com", "secret123").await;

    let (status, html) = app
        .post_form_following(
            "/signup",
            &[
                ("username", "Test"),
                ("email", "second@test.com"),
                ("password", "secret123"),
                ("image_url", ""),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Username already taken"));
    assert!(html.contains("Join Warbler today."));
}

#[tokio::test]
async fn signup_with_a_short_password_rerenders_with_the_error() {
    let app = TestApp::spawn().await;

    let (status, html) = app
        .post_form_following(
            "/signup",
            &[
                ("username", "Test"),
                ("email", "test@gmail.com"),
                ("password", "shrt"),
                ("image_url", ""),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Password must be at least 6 characters long"));
    assert!(users::find_by_username(&app.pool, "Test").await.unwrap().is_none());
}

#[tokio::test]
async fn login_greets_on_success_and_rejects_bad_credentials() {
    let app = TestApp::spawn().await;
    app.signup_user("testuser", "test@test.com", "testuser").await;

    let (status, html) = app
        .post_form_following(
            "/login",
            &[("username", "testuser"), ("password", "testuser")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Hello, testuser!"));
    assert!(html.contains(r#"<a href="/logout">Log out</a>"#));

    let (status, html) = app
        .post_form_following(
            "/login",
            &[("username", "testuser"), ("password", "wrongpassword")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Invalid credentials."));
    assert!(html.contains("Welcome back."));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let app = TestApp::spawn().await;
    let testuser = app.signup_user("testuser", "test@test.com", "testuser").await;
    let cookie = app.login_as(testuser.id);

    let (status, html) = app.get_following("/logout", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("You have successfully logged out."));
    assert!(html.contains("Welcome back."));

    // The same cookie no longer counts as logged in.
    let (_, html) = app.get_following("/", Some(&cookie)).await;
    assert!(html.contains("<p>Sign up now to get your own personalized timeline!</p>"));
}

#[tokio::test]
async fn login_page_redirects_home_when_already_logged_in() {
    let app = TestApp::spawn().await;
    let testuser = app.signup_user("testuser", "test@test.com", "testuser").await;
    let cookie = app.login_as(testuser.id);

    let response = app.get("/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn profile_edit_requires_the_right_password() {
    let app = TestApp::spawn().await;
    let testuser = app.signup_user("testuser", "test@test.com", "testuser").await;
    let cookie = app.login_as(testuser.id);

    let (status, html) = app
        .post_form_following(
            "/users/profile",
            &[
                ("username", "renamed"),
                ("email", "test@test.com"),
                ("image_url", ""),
                ("header_image_url", ""),
                ("bio", "warbling away"),
                ("location", ""),
                ("password", "wrongpassword"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Wrong password, please try again."));
    assert!(users::find_by_username(&app.pool, "renamed").await.unwrap().is_none());

    let response = app
        .post_form(
            "/users/profile",
            &[
                ("username", "renamed"),
                ("email", "test@test.com"),
                ("image_url", ""),
                ("header_image_url", ""),
                ("bio", "warbling away"),
                ("location", ""),
                ("password", "testuser"),
            ],
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let updated = users::find(&app.pool, testuser.id).await.unwrap().unwrap();
    assert_eq!(updated.username, "renamed");
    assert_eq!(updated.bio.as_deref(), Some("warbling away"));
}
