use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module under `/api`, plus `/metrics` at the root.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(http::players::init_routes)
            .configure(http::admin::init_routes)
            .configure(http::health::init_routes),
    )
    .service(http::health::metrics_text);
}
