use std::sync::Arc;

use anyhow::Context;
use shuttle_runtime::SecretStore;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

mod config;
mod error;
mod leaderboard;
mod models;
mod password;
mod ranking;
mod routes;
mod store;
mod users;

#[cfg(test)]
mod tests;

use config::AppConfig;
use routes::AppState;
use store::PgStore;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> shuttle_axum::ShuttleAxum {
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let config = AppConfig::from_secrets(&secrets);
    tracing::info!(origins = config.cors_origins.len(), "CORS configured");

    let state = AppState::new(Arc::new(PgStore::new(pool)));
    let router = routes::router(state)
        .layer(config.cors_layer())
        .layer(TraceLayer::new_for_http());

    Ok(router.into())
}
