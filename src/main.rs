use std::sync::Arc;

use tracing::info;

use intake_api::app::app;
use intake_api::config::config;
use intake_api::database::postgres::PostgresStore;
use intake_api::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_api=info,tower_http=info".into()),
        )
        .init();

    let config = config();
    info!(environment = ?config.environment, "starting intake-api");

    let store = PostgresStore::from_env()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {e}"));
    let state = AppState::new(Arc::new(store));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));
    info!(%addr, "listening");

    axum::serve(listener, app(state))
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
