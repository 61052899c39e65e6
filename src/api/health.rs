use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::StudyStore;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Liveness probe", body = String)
    )
)]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("hello")
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<dyn StudyStore>) -> impl Responder {
    let reachable = match db.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("⚠️ Health check ping failed: {}", e);
            false
        }
    };

    let body = HealthResponse {
        status: if reachable { "healthy" } else { "degraded" }.to_string(),
        database: if reachable { "connected" } else { "unreachable" }.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    if reachable {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
