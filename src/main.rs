use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use dotenvy::dotenv;
use serde_json::json;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod auth;
mod bootstrap;
mod clock;
mod config;
mod db;
mod docs;
mod error;
mod ledger;
mod model;
mod models;
mod period;
mod routes;
mod state;
mod store;
mod utils;

use crate::clock::{Clock, SystemClock};
use crate::docs::ApiDoc;
use crate::routes::RateLimits;
use crate::state::AppState;
use crate::store::{MemoryStore, MySqlStore, Store};
use config::Config;
use db::init_db;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(timezone = %config.timezone, "Server starting...");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(MySqlStore::new(init_db(url).await?)),
        None => {
            warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let today = clock.now().with_timezone(&config.timezone).date_naive();
    bootstrap::ensure_defaults(store.as_ref(), config.admin.as_ref(), today).await?;

    let state = Data::new(AppState::new(store, clock, &config));
    let limits = RateLimits::from_config(&config)?;

    let state_for_warmup = state.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = state_for_warmup
            .cpf_cache
            .warmup(state_for_warmup.store.as_ref(), 250)
            .await
        {
            warn!(error = %e, "Failed to warm up CPF cache");
        }
    });

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config_data, &limits))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
