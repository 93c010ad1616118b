// API layer - HTTP endpoints
pub mod admin;
pub mod auth;
pub mod health;
pub mod helpers;
pub mod proposals;

use std::sync::Arc;

use poem::middleware::{Cors, Tracing};
use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

pub use admin::AdminApi;
pub use auth::{AuthApi, BearerAuth};
pub use health::HealthApi;
pub use proposals::ProposalApi;

use crate::app_data::AppData;
use crate::config::AppSettings;

/// Compose the HTTP application
///
/// The OpenAPI service is mounted under `/api` and Swagger UI under
/// `/swagger`. Cross-origin requests are accepted from the configured
/// frontend origin only.
pub fn build_app(app_data: Arc<AppData>, settings: &AppSettings) -> impl Endpoint + use<> {
    let api_service = OpenApiService::new(
        (
            AuthApi::new(Arc::clone(&app_data)),
            ProposalApi::new(Arc::clone(&app_data)),
            AdminApi::new(Arc::clone(&app_data)),
            HealthApi::new(Arc::clone(&app_data)),
        ),
        "Investment Proposal API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("http://localhost:{}/api", settings.port()));

    let ui = api_service.swagger_ui();

    let cors = Cors::new()
        .allow_origin(settings.frontend_url())
        .allow_credentials(true);

    Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .with(cors)
        .with(Tracing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;
    use crate::test::utils::{FakeDirectory, TestContext};
    use crate::types::internal::UserRole;
    use poem::http::StatusCode;
    use poem::test::TestClient;

    async fn client() -> (TestContext, TestClient<impl Endpoint>) {
        let ctx = TestContext::new(FakeDirectory::new()).await;
        let settings = AppSettings::from_env_provider(&MockEnvironment::empty()).unwrap();
        let app = build_app(Arc::clone(&ctx.app_data), &settings);
        (ctx, TestClient::new(app))
    }

    #[tokio::test]
    async fn test_health_route() {
        let (_ctx, cli) = client().await;

        let resp = cli.get("/api/health").send().await;
        resp.assert_status_is_ok();
    }

    #[tokio::test]
    async fn test_login_route_round_trip() {
        let (ctx, cli) = client().await;
        ctx.local_user("rina", "password1", UserRole::CorpFa).await;

        let resp = cli
            .post("/api/auth/login")
            .body_json(&serde_json::json!({ "username": "rina", "password": "password1" }))
            .send()
            .await;
        resp.assert_status_is_ok();
        let body = resp.json().await;
        let token = body.value().object().get("access_token").string().to_string();

        let resp = cli
            .get("/api/auth/profile")
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await;
        resp.assert_status_is_ok();
        resp.json().await.value().object().get("username").assert_string("rina");
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let (_ctx, cli) = client().await;

        let resp = cli.get("/api/proposals").send().await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let (ctx, cli) = client().await;
        ctx.local_user("rina", "password1", UserRole::CorpFa).await;

        let resp = cli
            .post("/api/auth/login")
            .body_json(&serde_json::json!({ "username": "rina", "password": "wrong-one" }))
            .send()
            .await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
    }
}
