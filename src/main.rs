use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use todoforge::auth::{AuthMiddleware, CredentialManager};
use todoforge::config::Config;
use todoforge::store::{PgTaskStore, PgUserStore};
use todoforge::{db, routes, AppServices};

/// Picks the storage backend: Postgres when `DATABASE_URL` is set, in-memory otherwise.
async fn build_services(config: &Config) -> io::Result<AppServices> {
    let credentials = Arc::new(CredentialManager::from_config(config));

    match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.database_max_connections)
                .await
                .map_err(to_io_error)?;
            db::run_migrations(&pool).await.map_err(to_io_error)?;
            Ok(AppServices::new(
                Arc::new(PgTaskStore::new(pool.clone())),
                Arc::new(PgUserStore::new(pool)),
                credentials,
            ))
        }
        None => {
            log::warn!("DATABASE_URL is not set; using the in-memory store, data will not persist");
            Ok(AppServices::in_memory(credentials))
        }
    }
}

fn to_io_error<E: std::fmt::Display>(error: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, error.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        to_io_error(e)
    })?;
    let services = build_services(&config).await?;

    log::info!("Starting {} server at {}", env!("CARGO_PKG_NAME"), config.server_url());
    HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(|cfg| services.register(cfg))
            .configure(routes::config_public)
            .service(
                web::scope("/api/v1")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
