use std::env;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use quipboard_server::config::settings;
use quipboard_server::db::editor_repo::PgEditorDirectory;
use quipboard_server::db::roster_repo::PgRosterStorage;
use quipboard_server::http;
use quipboard_server::state::AppState;
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    // Configuration
    let cfg = settings();
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = cfg
        .jwt_secret
        .clone()
        .context("JWT_SECRET must be set")?;

    // Postgres pool
    let db_pool = PgPoolOptions::new()
        .max_connections(cfg.db_max_connections)
        .connect(&database_url)
        .await
        .context("Failed to create Postgres pool")?;

    // Schema: roster tables, editors, publish/discard functions
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to apply migrations")?;

    let state = web::Data::new(AppState::new(
        Arc::new(PgRosterStorage::new(db_pool.clone())),
        Arc::new(PgEditorDirectory::new(db_pool)),
        jwt_secret,
    ));

    log::info!("listening on {}", cfg.server_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(http::routes::init_routes)
    })
    .bind(&cfg.server_addr)?
    .run()
    .await?;
    Ok(())
}
