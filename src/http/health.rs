//! Liveness probe and metrics exposition.

use actix_web::{get, web, HttpResponse, Responder};

use crate::db::storage::RosterStorage;
use crate::metrics;
use crate::state::AppState;

#[get("/healthz")]
pub async fn healthz(state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = state.store.storage().ping().await {
        log::warn!("health check: storage unreachable: {e}");
        return HttpResponse::ServiceUnavailable().body("db");
    }
    HttpResponse::Ok().body("ok")
}

/// GET /metrics (mounted outside `/api`)
#[get("/metrics")]
pub async fn metrics_text() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::render())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz);
}
