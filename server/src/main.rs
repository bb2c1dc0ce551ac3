use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use invitation_server::config::{Config, StoreBackend};
use invitation_server::oauth::KakaoProvider;
use invitation_server::routes::create_routes;
use invitation_server::state::AppState;
use invitation_server::store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("invitation_server=info,tower_http=info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn Store> = match &config.store {
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => Arc::new(
            PgStore::connect(database_url, *max_connections)
                .await
                .expect("Failed to connect to database"),
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let identity = Arc::new(KakaoProvider::new(config.kakao.clone()));
    let addr = config.socket_addr().expect("Invalid bind address");
    let app = create_routes(AppState::new(config, store, identity));

    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
