use actix_web::{web, HttpResponse, Responder};

use crate::models::{HealthResponse, WelcomeResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(welcome))
        .route("/health", web::get().to(health_check));
}

async fn welcome() -> impl Responder {
    HttpResponse::Ok().json(WelcomeResponse {
        message: "Matchmaker API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let backend_healthy = match state.supabase.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Backend health check failed: {}", e);
            false
        }
    };

    let status = if backend_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
    })
}
