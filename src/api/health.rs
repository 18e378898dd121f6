use crate::store::ProfileStore;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `ok` when the profile store answers, `degraded` otherwise.
    pub status: String,
    pub database: String,
    pub version: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Process is up; `status` reports database reachability", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<dyn ProfileStore>) -> HttpResponse {
    // Degraded still answers 200: the process serves 503s per request until the database returns
    let (status, database) = match store.ping().await {
        Ok(()) => ("ok", "connected".to_string()),
        Err(e) => {
            log::warn!("🩺 Health check degraded: {}", e);
            ("degraded", "unavailable".to_string())
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
