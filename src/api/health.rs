use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::database::{StoreState, StoreStatus};
use crate::models::MessageResponse;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub store: StoreState,
    pub timestamp: i64,
}

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Server responds", body = MessageResponse)
    )
)]
pub async fn hello() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse {
        msg: "Hello there!".to_string(),
    })
}

/// Reports the process as up, along with the record store connection state.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(status: web::Data<StoreStatus>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: status.get(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
