mod common;

use common::TestApp;
use warbler::db::{messages, users};

#[tokio::test]
async fn message_with_valid_fields_persists() {
    let app = TestApp::spawn().await;
    let user = app
        .signup_user("testuser11", "test11@test.com", "HASHED_PASSWORD")
        .await;

    let message = messages::create(&app.pool, "test", user.id).await.unwrap();

    assert_eq!(message.user_id, user.id);
    assert_eq!(message.text, "test");

    let owned = messages::for_user(&app.pool, user.id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, message.id);
}

#[tokio::test]
async fn message_with_empty_text_fails_at_insert() {
    let app = TestApp::spawn().await;
    let user = app
        .signup_user("testuser11", "test11@test.com", "HASHED_PASSWORD")
        .await;

    let err = messages::create(&app.pool, "", user.id).await.unwrap_err();
    assert!(err.is_database_error());
    assert!(err.is_integrity());
}

#[tokio::test]
async fn message_with_unknown_owner_fails_at_insert() {
    let app = TestApp::spawn().await;
    let user = app
        .signup_user("testuser11", "test11@test.com", "HASHED_PASSWORD")
        .await;

    let err = messages::create(&app.pool, "test", user.id + 999)
        .await
        .unwrap_err();
    assert!(err.is_foreign_key_violation());
}

#[tokio::test]
async fn message_over_the_length_cap_fails_at_insert() {
    let app = TestApp::spawn().await;
    let user = app
        .signup_user("testuser11", "test11@test.com", "HASHED_PASSWORD")
        .await;

    let long = "w".repeat(141);
    let err = messages::create(&app.pool, &long, user.id).await.unwrap_err();
    assert!(err.is_integrity());

    let at_cap = "w".repeat(140);
    assert!(messages::create(&app.pool, &at_cap, user.id).await.is_ok());
}

#[tokio::test]
async fn timeline_mixes_own_and_followed_messages_only() {
    let app = TestApp::spawn().await;
    let me = app.signup_user("me", "me@test.com", "password").await;
    let followed = app.signup_user("followed", "f@test.com", "password").await;
    let stranger = app.signup_user("stranger", "s@test.com", "password").await;

    warbler::db::follows::follow(&app.pool, me.id, followed.id)
        .await
        .unwrap();

    messages::create(&app.pool, "mine", me.id).await.unwrap();
    messages::create(&app.pool, "from followed", followed.id)
        .await
        .unwrap();
    messages::create(&app.pool, "from stranger", stranger.id)
        .await
        .unwrap();

    let timeline = messages::timeline(&app.pool, me.id, 100).await.unwrap();
    let texts: Vec<&str> = timeline.iter().map(|m| m.text.as_str()).collect();

    assert!(texts.contains(&"mine"));
    assert!(texts.contains(&"from followed"));
    assert!(!texts.contains(&"from stranger"));

    // stats see the same world
    let stats = users::stats(&app.pool, me.id).await.unwrap();
    assert_eq!(stats.messages, 1);
    assert_eq!(stats.following, 1);
}
