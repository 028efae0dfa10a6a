use std::time::Duration;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};
use server::{GeminiConfig, Recommender, ServerState};
use settings::Database;

mod settings;

const POSTGRES_MAX_CONNECTIONS: u32 = 25;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "rewards={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.database).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .search_ttl(Duration::from_secs(settings.cache.search_ttl_secs))
        .build()
        .await?;

    let recommender = match settings.ai {
        Some(ai) => {
            tracing::info!(model = %ai.model, "Found AI settings...");
            Recommender::new(Some(GeminiConfig {
                api_key: ai.api_key,
                model: ai.model,
                endpoint: ai.endpoint,
                timeout: Duration::from_secs(ai.timeout_secs),
            }))
        }
        None => Recommender::fallback_only(),
    };

    let state = ServerState::new(
        engine,
        recommender,
        Duration::from_secs(settings.server.request_timeout_secs),
    );
    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    server::run_with_listener(state, listener, shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let mut options = match config {
        Database::Memory => ConnectOptions::new("sqlite::memory:".to_string()),
        Database::Sqlite(path) => ConnectOptions::new(format!("sqlite:{path}?mode=rwc")),
        Database::Postgres(url) => ConnectOptions::new(url.clone()),
    };
    match config {
        // SQLite has no row locks; one connection serializes writers.
        Database::Memory | Database::Sqlite(_) => options.max_connections(1).min_connections(1),
        Database::Postgres(_) => options.max_connections(POSTGRES_MAX_CONNECTIONS),
    };
    options.sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
