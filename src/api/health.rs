use std::sync::Arc;

use poem_openapi::{OpenApi, Tags, payload::Json};
use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::providers::Clock;
use crate::types::dto::common::HealthResponse;

/// Liveness and database reachability
pub struct HealthApi {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl HealthApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            clock: Arc::clone(&app_data.clock),
        }
    }
}

/// API tags for health endpoints
#[derive(Tags)]
enum ApiTags {
    /// Health check endpoints
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Health check endpoint
    ///
    /// Reports `degraded` when the database does not answer a ping.
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        let status = match self.db.ping().await {
            Ok(()) => "healthy",
            Err(e) => {
                tracing::error!(error = %e, "database ping failed");
                "degraded"
            }
        };

        Json(HealthResponse {
            status: status.to_string(),
            timestamp: self.clock.now().to_rfc3339(),
        })
    }
}
