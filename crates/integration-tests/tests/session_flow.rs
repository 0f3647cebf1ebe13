//! Sign-in, sign-up and session persistence against the mock API.

#![allow(clippy::unwrap_used)]

use relux_core::{CartState, LoginForm, NoticeLevel, Overlay, Route, Session, SignupForm};
use relux_integration_tests::{
    CART, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, LOGIN, MockApi, REGISTER,
};
use relux_storefront::{ClientError, Storefront};
use secrecy::SecretString;
use tempfile::TempDir;

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: SecretString::from(password.to_string()),
    }
}

fn signup_form(email: &str) -> SignupForm {
    SignupForm {
        name: "Jose Rizal".to_string(),
        email: email.to_string(),
        password: SecretString::from("noli-me".to_string()),
        password_confirmation: SecretString::from("noli-me".to_string()),
        agree_to_terms: true,
    }
}

async fn open(api: &MockApi, dir: &TempDir, hash: &str) -> Storefront {
    let config = api.config(dir.path()).unwrap();
    let mut app = Storefront::from_config(&config).unwrap();
    app.start(hash).await.unwrap();
    app
}

#[tokio::test]
async fn test_login_persists_and_restores_session() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();

    let mut app = open(&api, &dir, "").await;
    let user = app
        .login(&login_form(CUSTOMER_EMAIL, CUSTOMER_PASSWORD))
        .await
        .unwrap();
    assert_eq!(user.email, CUSTOMER_EMAIL);
    assert!(matches!(app.state().cart, CartState::Loaded(_)));

    let notices = app.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices.first().unwrap().level, NoticeLevel::Success);
    assert_eq!(notices.first().unwrap().message, "Welcome back, Maria!");
    drop(app);

    // A new run picks the session up from disk and loads the cart
    let again = open(&api, &dir, "#orders").await;
    assert_eq!(again.user().map(|u| u.email.as_str()), Some(CUSTOMER_EMAIL));
    assert_eq!(again.state().route, Route::Orders);
    assert_eq!(api.hits(CART), 2);
    assert_eq!(api.hits(LOGIN), 1);
}

#[tokio::test]
async fn test_wrong_password_opens_sign_in() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;

    let err = app
        .login(&login_form(CUSTOMER_EMAIL, "not-it"))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert_eq!(app.state().session, Session::Anonymous);
    assert_eq!(app.state().overlay, Overlay::Auth);
    assert_eq!(
        app.drain_notices().first().map(|n| n.message.clone()),
        Some("Invalid credentials".to_string())
    );
    assert!(!dir.path().join("storage.json").exists());
}

#[tokio::test]
async fn test_invalid_login_form_is_not_sent() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;

    let err = app.login(&login_form("maria@", "")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(api.hits(LOGIN), 0);
}

#[tokio::test]
async fn test_signup_signs_in() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;
    app.open_auth();

    let user = app.signup(&signup_form("jose@relux.ph")).await.unwrap();
    assert_eq!(user.name, "Jose Rizal");
    assert!(app.state().session.is_authenticated());
    assert_eq!(app.state().overlay, Overlay::None);
    assert_eq!(
        app.drain_notices().first().map(|n| n.message.clone()),
        Some("Welcome to Relux, Jose!".to_string())
    );
}

#[tokio::test]
async fn test_signup_with_taken_email_shows_server_message() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;

    let err = app.signup(&signup_form(CUSTOMER_EMAIL)).await.unwrap_err();
    assert_eq!(err.user_message(), "The email has already been taken.");
    assert_eq!(api.hits(REGISTER), 1);
    assert!(!app.state().session.is_authenticated());

    let notices = app.drain_notices();
    assert_eq!(notices.first().map(|n| n.level), Some(NoticeLevel::Error));
}

#[tokio::test]
async fn test_signup_without_terms_is_not_sent() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;

    let mut form = signup_form("jose@relux.ph");
    form.agree_to_terms = false;
    let err = app.signup(&form).await.unwrap_err();
    assert!(err.field_errors().is_some());
    assert_eq!(api.hits(REGISTER), 0);
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;
    app.login(&login_form(CUSTOMER_EMAIL, CUSTOMER_PASSWORD))
        .await
        .unwrap();
    app.open_cart().await.unwrap();

    app.logout().await.unwrap();
    assert_eq!(app.state().session, Session::Anonymous);
    assert_eq!(app.state().cart, CartState::Idle);
    assert_eq!(app.state().overlay, Overlay::None);
    drop(app);

    let again = open(&api, &dir, "").await;
    assert!(again.user().is_none());
}

#[tokio::test]
async fn test_expired_token_prompts_sign_in() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut app = open(&api, &dir, "").await;
    app.login(&login_form(CUSTOMER_EMAIL, CUSTOMER_PASSWORD))
        .await
        .unwrap();
    app.drain_notices();

    api.revoke_tokens();
    let err = app.open_cart().await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(app.state().overlay, Overlay::Auth);
    assert!(app.state().cart.error().is_some());
    assert_eq!(
        app.drain_notices().first().map(|n| n.level),
        Some(NoticeLevel::Warning)
    );
}

#[tokio::test]
async fn test_corrupt_storage_file_is_replaced() {
    let api = MockApi::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "{truncated").unwrap();

    let mut app = open(&api, &dir, "").await;
    assert_eq!(app.state().session, Session::Anonymous);
    assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");

    app.login(&login_form(CUSTOMER_EMAIL, CUSTOMER_PASSWORD))
        .await
        .unwrap();
    let notices = app.drain_notices();
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Success));
    drop(app);

    let again = open(&api, &dir, "").await;
    assert!(again.state().session.is_authenticated());
}
