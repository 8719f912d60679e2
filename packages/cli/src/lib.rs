// ABOUTME: Composition root for the Tessera service
// ABOUTME: Builds store, provider, and router from configuration and serves them

use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use tessera_api::{manage, AuthProvider, HeaderProvider, StaticProvider, TokenApi, TokenState};
use tessera_storage::{MemoryTokenStore, SqliteTokenStore, StorageResult, TokenStore};

pub mod config;
pub mod health;
pub mod middleware;


use config::{Config, ConfigError, ProviderKind, StoreKind};

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}

/// Open the store selected by `config`
pub async fn open_store(config: &Config) -> StorageResult<Arc<dyn TokenStore>> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory token store");
            Ok(Arc::new(MemoryTokenStore::new()))
        }
        StoreKind::Sqlite => {
            let store = SqliteTokenStore::connect(&config.database_path, 10).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Build the auth provider selected by `config`
pub fn build_provider(config: &Config) -> Arc<dyn AuthProvider> {
    match config.auth_provider {
        ProviderKind::Static => Arc::new(StaticProvider::new(
            config.default_user.clone(),
            config.default_policy.clone(),
        )),
        ProviderKind::Header => Arc::new(HeaderProvider::new(config.default_policy.clone())),
    }
}

/// Assemble the full application: health check, token management routes,
/// and the tracing, CORS, and panic layers.
pub fn build_app(state: TokenState, config: &Config) -> Result<Router, ConfigError> {
    let origin = config
        .cors_origin
        .parse::<axum::http::HeaderValue>()
        .map_err(|_| ConfigError::InvalidCorsOrigin(config.cors_origin.clone()))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = Router::new().route("/api/health", get(health::health_check));

    Ok(manage(app, state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::create_panic_handler()))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let api = Arc::new(TokenApi::new(store, config.policies.clone()));
    let state = TokenState::new(api, build_provider(&config));
    let app = build_app(state, &config)?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Tessera listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
