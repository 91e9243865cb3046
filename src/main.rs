use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use std::sync::Arc;

mod api;
mod app_state;
mod auth;
mod config;
mod db;
mod docs;
mod model;
mod models;
mod routes;
mod store;
mod tracker;
mod utils;

#[cfg(test)]
mod test_support;

use app_state::AppState;
use config::{Config, StorageBackend};
use db::init_db;
use store::{MemoryStore, MySqlStore};
use tracker::{Clock, SystemClock};

use crate::docs::ApiDoc;
use tracing::{error, info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance service is running. API docs at /swagger-ui/"
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Invalid configuration: {}", e);
        io_error(e)
    })?;

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

    info!(backend = config.storage_backend.as_ref(), "Server starting...");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = match config.storage_backend {
        StorageBackend::Mysql => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| io_error("DATABASE_URL is required for the mysql backend"))?;
            let pool = init_db(database_url).await.map_err(|e| {
                error!(error = %e, "Failed to connect to database");
                io_error(e)
            })?;

            let store = MySqlStore::new(pool);
            store.run_migrations().await.map_err(|e| {
                error!(error = %e, "Failed to run migrations");
                io_error(e)
            })?;
            AppState::new(Arc::new(store), StorageBackend::Mysql, &config, clock)
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory store, records are lost on restart");
            AppState::new(Arc::new(MemoryStore::new()), StorageBackend::Memory, &config, clock)
        }
    };

    state
        .seed_admin(&config.admin_username, &config.admin_password)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to seed administrator");
            io_error(e)
        })?;

    let state = Data::new(state);

    let filter = state.document_filter.clone();
    let directory = state.directory.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = filter.warmup(directory.as_ref(), 100).await {
            error!(error = %e, "Failed to warmup document filter");
        }
    });

    let cache = state.employee_cache.clone();
    let directory = state.directory.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = cache.warmup(directory.as_ref(), 250).await {
            error!(error = %e, "Failed to warmup employee cache");
        }
    });

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let openapi = ApiDoc::with_prefix(&config.api_prefix);
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(state.clone())
            .app_data(config_data.clone())
            .service(index)
            // auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.get_ref().clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
