// Forbid unwrap() in production code to prevent panics while serving.
// Test code is allowed to use unwrap() for convenience.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
use std::net::SocketAddr;
use std::sync::Arc;

use agendify::{
    AppState,
    config::{SecretSource, ServerConfig},
    router,
    store::InMemoryStore,
    time::SystemTimeSource,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agendify=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if config.secret_source == SecretSource::DevelopmentDefault {
        tracing::warn!(
            "AGENDIFY_JWT_SECRET is not set; using the development secret. \
             Tokens issued by this process are forgeable. Never run this way in production."
        );
    }

    tracing::info!(
        "Loaded configuration: listen_host={}, listen_port={}, bcrypt_cost={}",
        config.listen_host,
        config.listen_port,
        config.bcrypt_cost
    );

    let state = AppState::new(
        &config.jwt,
        config.password_hasher(),
        Arc::new(InMemoryStore::new()),
        Arc::new(SystemTimeSource),
    );
    let app = router(state);

    let addr = SocketAddr::new(config.listen_host, config.listen_port);
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
