/// Health and greeting endpoints
use crate::services::PostService;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use std::time::Instant;

pub async fn greeting() -> HttpResponse {
    HttpResponse::Ok().body("Hello")
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "alive": true }))
}

pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "posts-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness: the store must answer a ping
pub async fn readiness_check(service: web::Data<PostService>) -> HttpResponse {
    let start = Instant::now();
    let result = service.store().ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "ready": true,
            "store": { "status": "healthy", "latency_ms": latency_ms },
            "timestamp": Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "ready": false,
                "store": {
                    "status": "unhealthy",
                    "message": format!("Store ping failed: {}", e),
                    "latency_ms": latency_ms,
                },
                "timestamp": Utc::now().to_rfc3339(),
            }))
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(greeting))
        .route("/api/v1/health", web::get().to(health_summary))
        .route("/api/v1/health/live", web::get().to(liveness_check))
        .route("/api/v1/health/ready", web::get().to(readiness_check));
}
