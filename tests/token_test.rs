mod common;

use std::sync::Arc;

use common::{JWT_SECRET, StaticDirectory, TestApp};
use proposal_backend::coordinators::LoginCoordinator;
use proposal_backend::errors::InternalError;
use proposal_backend::types::internal::{ClientMeta, RequestContext, UserRole};

async fn issue(app: &TestApp) -> String {
    LoginCoordinator::new(Arc::clone(&app.app_data))
        .login(&RequestContext::for_api(ClientMeta::default()), "tono", "tono-pass1")
        .await
        .unwrap()
        .0
        .token
}

fn authenticate(app: &TestApp, token: &str) -> Result<RequestContext, InternalError> {
    app.app_data
        .authorization_provider
        .authenticate(RequestContext::for_api(ClientMeta::default()), Some(token))
}

#[tokio::test]
async fn test_token_valid_until_expiry() {
    let app = TestApp::new(StaticDirectory::default()).await;
    let user = app.local_user("tono", "tono-pass1", UserRole::Cfo).await;
    let token = issue(&app).await;

    let ctx = authenticate(&app, &token).unwrap();
    let caller = ctx.caller().unwrap();
    assert_eq!(caller.user_id, user.id);
    assert_eq!(caller.role, UserRole::Cfo);

    // Expiry is eight hours in the test configuration
    app.clock.advance(chrono::Duration::hours(8) - chrono::Duration::seconds(1));
    assert!(authenticate(&app, &token).is_ok());

    app.clock.advance(chrono::Duration::seconds(1));
    assert!(matches!(authenticate(&app, &token), Err(InternalError::Token(_))));
}

#[tokio::test]
async fn test_token_from_another_secret_is_rejected() {
    let foreign = TestApp::with_secret(StaticDirectory::default(), "a-completely-different-secret-of-40-chars").await;
    foreign.local_user("tono", "tono-pass1", UserRole::Cfo).await;
    let token = issue(&foreign).await;

    let app = TestApp::new(StaticDirectory::default()).await;
    assert_ne!(JWT_SECRET, "a-completely-different-secret-of-40-chars");
    assert!(matches!(authenticate(&app, &token), Err(InternalError::Token(_))));
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let app = TestApp::new(StaticDirectory::default()).await;
    app.local_user("tono", "tono-pass1", UserRole::Cfo).await;
    let token = issue(&app).await;

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[2] = parts[2].chars().rev().collect();
    let tampered = parts.join(".");

    assert!(authenticate(&app, &tampered).is_err());
    assert!(authenticate(&app, "").is_err());
}
