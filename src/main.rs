use std::error::Error;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use event_networking::adapters::events::TracingEventPublisher;
use event_networking::adapters::http::{build_router, NetworkingAppState};
use event_networking::adapters::memory::{InMemoryNetworkingStore, SeedFile};
use event_networking::adapters::postgres::{
    self, PostgresAccessGate, PostgresDirectoryReader, PostgresLedgerRepository,
};
use event_networking::config::{
    AppConfig, DatabaseConfig, LogFormat, ServerConfig, StorageBackend, StorageConfig,
};
use event_networking::ports::EventPublisher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let addr = config.server.socket_addr()?;
    let publisher: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher::new());

    let state = match config.storage.backend {
        StorageBackend::Memory => memory_state(&config.storage, publisher).await?,
        StorageBackend::Postgres => postgres_state(&config.database, publisher).await?,
    };

    let app = build_router(state, &config.server);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        backend = ?config.storage.backend,
        environment = ?config.server.environment,
        "Event networking service listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

/// `RUST_LOG` wins over `server.log_level` when set.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match server.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Pretty => subscriber.init(),
    }
}

async fn memory_state(
    storage: &StorageConfig,
    publisher: Arc<dyn EventPublisher>,
) -> Result<NetworkingAppState, Box<dyn Error>> {
    let store = Arc::new(InMemoryNetworkingStore::new());

    if let Some(path) = &storage.seed_file {
        let summary = SeedFile::load(path).await?.apply(&store).await?;
        tracing::info!(
            path = %path.display(),
            events = summary.events,
            attendees = summary.attendees,
            "Seeded in-memory store"
        );
    } else {
        tracing::warn!("In-memory store started empty; no seed file configured");
    }

    Ok(NetworkingAppState::new(
        store.clone(),
        store.clone(),
        store,
        publisher,
    ))
}

async fn postgres_state(
    database: &DatabaseConfig,
    publisher: Arc<dyn EventPublisher>,
) -> Result<NetworkingAppState, Box<dyn Error>> {
    let pool = postgres::connect(database).await?;

    if database.run_migrations {
        postgres::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(NetworkingAppState::new(
        Arc::new(PostgresLedgerRepository::new(pool.clone())),
        Arc::new(PostgresDirectoryReader::new(pool.clone())),
        Arc::new(PostgresAccessGate::new(pool)),
        publisher,
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
