//! # StudyDesk API Server
//!
//! REST API for the StudyDesk study planner:
//! - Tasks on a Kanban board (todo / doing / done) with due dates
//! - Free-text categories with automatic colors
//! - Flashcards and document summaries
//! - Two-way Google Calendar synchronization
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p studydesk-api
//! ```

use std::sync::Arc;

use studydesk_api::{
    app::{build_router, AppState},
    config::Config,
};
use studydesk_shared::calendar::{CalendarProvider, GoogleCalendar};
use studydesk_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studydesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "StudyDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    let calendar: Arc<dyn CalendarProvider> = match &config.calendar.base_url {
        Some(base_url) => Arc::new(GoogleCalendar::with_base_url(base_url.clone())),
        None => Arc::new(GoogleCalendar::new()),
    };

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, calendar);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    } else {
        tracing::info!("Shutdown signal received");
    }
}
