use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use ticket_payout::application::engine::PayoutEngine;
use ticket_payout::config::{Backend, Cli, DatabaseConfig};
use ticket_payout::domain::ports::{SchemaAdmin, SchemaAdminRef, TicketStore, TicketStoreRef};
use ticket_payout::domain::ticket::Ticket;
use ticket_payout::infrastructure::in_memory::InMemoryTicketStore;
use ticket_payout::interfaces::csv::ticket_reader::TicketReader;
use ticket_payout::interfaces::http::{admin_router, payout_router};
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// One backend seen through both of its ports.
struct Stores {
    tickets: TicketStoreRef,
    admin: SchemaAdminRef,
}

impl Stores {
    fn shared<S: TicketStore + SchemaAdmin + 'static>(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            tickets: store.clone(),
            admin: store,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ticket_payout=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let stores = match cli.backend() {
        Backend::MySql(config) => mysql_stores(&config, cli.seed.as_deref()).await?,
        Backend::RocksDb(path) => rocksdb_stores(&path, cli.seed.as_deref()).await?,
        Backend::InMemory => memory_stores(cli.seed.as_deref()).await?,
    };

    let engine = Arc::new(PayoutEngine::with_timeout(stores.tickets, cli.store_timeout()));

    let listener = TcpListener::bind(cli.listen_addr()).await.into_diagnostic()?;
    tracing::info!(addr = %cli.listen_addr(), "payout API listening");
    let payout =
        axum::serve(listener, payout_router(engine)).with_graceful_shutdown(shutdown_signal());

    match cli.admin_token {
        Some(token) => {
            let admin_listener = TcpListener::bind(cli.admin_addr).await.into_diagnostic()?;
            tracing::info!(addr = %cli.admin_addr, "admin API listening");
            let admin = axum::serve(admin_listener, admin_router(stores.admin, token))
                .with_graceful_shutdown(shutdown_signal());
            tokio::try_join!(async { payout.await }, async { admin.await }).into_diagnostic()?;
        }
        None => {
            tracing::info!("admin API disabled (no ADMIN_TOKEN)");
            payout.await.into_diagnostic()?;
        }
    }

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn read_seed(path: &Path) -> Result<Vec<Ticket>> {
    let file = File::open(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot open seed file {}", path.display()))?;
    TicketReader::new(file)
        .tickets()
        .collect::<ticket_payout::error::Result<Vec<_>>>()
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid seed file {}", path.display()))
}

async fn memory_stores(seed: Option<&Path>) -> Result<Stores> {
    let store = InMemoryTicketStore::new();
    if let Some(path) = seed {
        for ticket in read_seed(path)? {
            store.insert(ticket).await;
        }
        tracing::info!(tickets = store.len().await, "seeded in-memory store");
    }
    Ok(Stores::shared(store))
}

#[cfg(feature = "storage-rocksdb")]
async fn rocksdb_stores(path: &Path, seed: Option<&Path>) -> Result<Stores> {
    use ticket_payout::infrastructure::rocksdb::RocksDBStore;

    let store = RocksDBStore::open(path).into_diagnostic()?;
    if let Some(seed) = seed {
        let tickets = read_seed(seed)?;
        let count = tickets.len();
        for ticket in tickets {
            store.insert(ticket).await.into_diagnostic()?;
        }
        tracing::info!(tickets = count, "seeded RocksDB store");
    }
    tracing::info!(path = %path.display(), "using RocksDB store");
    Ok(Stores::shared(store))
}

#[cfg(not(feature = "storage-rocksdb"))]
async fn rocksdb_stores(_path: &Path, seed: Option<&Path>) -> Result<Stores> {
    tracing::warn!(
        "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. \
         Falling back to In-Memory storage."
    );
    memory_stores(seed).await
}

#[cfg(feature = "storage-mysql")]
async fn mysql_stores(config: &DatabaseConfig, seed: Option<&Path>) -> Result<Stores> {
    use ticket_payout::infrastructure::mysql::MySqlTicketStore;

    if seed.is_some() {
        tracing::warn!("--seed is ignored for the MySQL store");
    }
    let store = MySqlTicketStore::connect(config)
        .await
        .into_diagnostic()
        .wrap_err("error connecting to database")?;
    Ok(Stores::shared(store))
}

#[cfg(not(feature = "storage-mysql"))]
async fn mysql_stores(_config: &DatabaseConfig, seed: Option<&Path>) -> Result<Stores> {
    tracing::warn!(
        "Database requested via --db-host, but 'storage-mysql' feature is not enabled. \
         Falling back to In-Memory storage."
    );
    memory_stores(seed).await
}
