// src/main.rs

use std::io;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vitrine::config::AppConfig;
use vitrine::store::PgShopStore;
use vitrine::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // A missing .env file is fine; real deployments set the variables directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info,actix_web=info".into()),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    // Price columns must be NUMERIC/DECIMAL to match bigdecimal::BigDecimal.
    let db_pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to connect to PostgreSQL");
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    let app_state = web::Data::new(AppState {
        store: Arc::new(PgShopStore::new(db_pool)),
        jwt_secret: config.jwt_secret.clone(),
    });

    info!(bind_addr = %config.bind_addr, "starting vitrine API");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::NormalizePath::trim())
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(vitrine::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
