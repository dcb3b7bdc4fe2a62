// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::Parser;
use elabel::{
    api::{self, AppState},
    config::Settings,
    store::{MemoryStore, Store}
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&settings.log_filter).context("invalid log filter")?)
        .init();

    match settings.database_url.clone() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&url)
                .await
                .context("failed to connect to database")?;
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;
            tracing::info!("using PostgreSQL store");
            serve(pool, settings).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            serve(MemoryStore::new(), settings).await
        }
    }
}

async fn serve<R: Store>(store: R, settings: Settings) -> anyhow::Result<()> {
    let bind = settings.bind;
    if settings.admin_token.is_none() {
        tracing::warn!("no admin token configured, /api is open");
    }

    let app = api::router(AppState::new(store, settings));
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!("listening on http://{bind}");
    tracing::info!("Swagger UI: http://{bind}/swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await
        .context("server error")
}

async fn shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
