use crate::database::DukaanStore;
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Welcome message")
    )
)]
pub async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to Dukaan Rating API"
    }))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<dyn DukaanStore>) -> impl Responder {
    let (status, database) = match store.ping().await {
        Ok(()) => ("healthy", "up".to_string()),
        Err(e) => {
            log::warn!("⚠️  Health check failed: {}", e);
            ("unhealthy", "down".to_string())
        }
    };

    let body = HealthResponse {
        status: status.to_string(),
        service: "achi-dukaan".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        timestamp: chrono::Utc::now().timestamp(),
    };

    if status == "healthy" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
