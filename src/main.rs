// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use chrono::Duration;
use log::{error, info};

use blog_api::config::{self, Config, StoreBackend};
use blog_api::middleware::auth_extractor::AUTH_TOKEN_HEADER;
use blog_api::repositories::{
    ensure_schema, InMemoryStore, PgPostRepository, PgUserRepository, PostRepository,
    UserRepository,
};
use blog_api::services::token_service::TokenService;
use blog_api::services::upload_service::UploadService;
use blog_api::{configure_app, AppState};

type Stores = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

async fn open_stores(cfg: &Config) -> anyhow::Result<Stores> {
    match cfg.store {
        StoreBackend::Memory => {
            info!("Using in-memory store, data is lost on restart");
            let store = InMemoryStore::new();
            Ok((Arc::new(store.clone()), Arc::new(store)))
        }
        StoreBackend::Postgres => {
            let url = cfg.database_url.as_deref().unwrap_or_default();
            let pool = config::get_pg_pool(url, cfg.pool_size)?;
            ensure_schema(&pool).await?;
            info!("Postgres store ready (pool size {})", cfg.pool_size);
            Ok((
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgPostRepository::new(pool)),
            ))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let (users, posts) = match open_stores(&cfg).await {
        Ok(stores) => stores,
        Err(e) => {
            error!("Failed to open store: {:#}", e);
            std::process::exit(1);
        }
    };

    let tokens = TokenService::new(&cfg.token_secret, Duration::seconds(cfg.token_ttl_secs));
    let uploads = UploadService::new(cfg.storage_dir.clone());
    std::fs::create_dir_all(uploads.storage_dir())?;

    let state = AppState::new(tokens, uploads, users, posts);
    let allowed_origins = cfg.allowed_origins.clone();

    let bind_address = format!("0.0.0.0:{}", cfg.port);
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", AUTH_TOKEN_HEADER])
            .expose_headers(vec![AUTH_TOKEN_HEADER])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(|c| configure_app(c, &state))
    })
    .bind(&bind_address)?
    .run()
    .await
}
