use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, models::dto::response::HealthResponse};

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[get("/health/ready")]
pub async fn health_check_ready(state: web::Data<AppState>) -> HttpResponse {
    let storage = state.quiz_service.health_check().await;
    if let Err(e) = &storage {
        log::warn!("Readiness check failed: {}", e);
    }

    let response = serde_json::json!({
        "status": if storage.is_ok() { "ready" } else { "not_ready" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "storage": if storage.is_ok() { "ok" } else { "error" }
        },
        "settings": {
            "storage_backend": state.config.storage_backend.as_str(),
            "llm_model": state.config.llm_model,
            "llm_max_attempts": state.config.llm_max_attempts,
        }
    });

    if storage.is_ok() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
