//! Server binary: reads settings, picks PostgreSQL or the in-memory store, and serves the API.

use campus_registry::{app, ensure_database_exists, ensure_tables, AppState, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(campus_registry::config::DEFAULT_LOG_FILTER)),
        )
        .init();

    let settings = Settings::from_env()?;

    let state = match &settings.database_url {
        Some(url) => {
            ensure_database_exists(url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(url)
                .await?;
            ensure_tables(&pool).await?;
            tracing::info!("connected to PostgreSQL");
            AppState::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data will not survive restarts");
            AppState::in_memory()
        }
    };

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, &settings))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
