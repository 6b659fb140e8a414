use anyhow::Context;
use trivia_api::config::load_settings;
use trivia_api::db;
use trivia_api::server::app::run_server;
use trivia_api::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = load_settings().context("Failed to load settings")?;
    tracing::info!(?settings, "Configuration loaded");

    let pool = db::establish_connection(&settings.database.path)
        .await
        .with_context(|| format!("Cannot connect to DB at {}", settings.database.path))?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    run_server(pool, &settings).await
}
