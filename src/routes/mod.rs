pub mod news;

use axum::{response::IntoResponse, routing::get, Json, Router};
use http::{HeaderValue, Method, StatusCode};
use serde_json::json;
use std::{error::Error, sync::Arc};
use tokio::task::JoinHandle;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

pub use news::news_routes;

use crate::{
    services::{fetcher::BingFetcher, news_cache::NewsCache},
    store::{spawn_expiry_sweeper, MemoryStore, PgStore, Store},
    utils::{
        config::{CacheBackend, Config},
        state::AppState,
    },
};

/// Everything `main` needs to serve and later shut down cleanly.
pub struct App {
    pub router: Router,
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub sweeper: JoinHandle<()>,
}

pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target("axum::rejection", Level::TRACE)
        .with_target("news_cache", level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();
}

pub async fn make_app() -> Result<App, Box<dyn Error>> {
    info!("Initializing application...");
    let config = Config::init()?;
    info!("Configuration loaded successfully");

    let store: Arc<dyn Store> = match config.cache_backend {
        CacheBackend::Postgres => Arc::new(PgStore::connect(&config.db_url).await?),
        CacheBackend::Memory => {
            info!("Using in-memory cache store");
            Arc::new(MemoryStore::new())
        }
    };
    let sweeper = spawn_expiry_sweeper(store.clone(), config.sweep_interval);

    let fetcher = BingFetcher::new(
        &config.news_api_url,
        &config.news_api_key,
        config.upstream_timeout,
    )?;
    info!("External clients initialized successfully");

    let state = Arc::new(AppState {
        news_cache: NewsCache::new(store.clone(), Arc::new(fetcher)),
    });

    let router = Router::new()
        .route("/", get(health_check))
        .merge(news_routes())
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    info!("Application initialized successfully");

    Ok(App {
        router,
        config,
        store,
        sweeper,
    })
}

fn cors_layer(config: &Config) -> Result<CorsLayer, Box<dyn Error>> {
    let origins = config
        .origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;
    let methods = config
        .methods
        .iter()
        .map(|m| Method::from_bytes(m.to_uppercase().as_bytes()))
        .collect::<Result<Vec<_>, _>>()?;

    // No configured origins means any origin may call.
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(methods)
        .allow_headers([http::header::CONTENT_TYPE]))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": "Hello World"}))).into_response()
}
