//! Command-line and environment configuration.
//!
//! Every option can also be supplied through the environment (and a `.env`
//! file), so deployments keep database credentials out of the command line.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Port for the payout API.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Address for the admin API. Only served when an admin token is set.
    #[arg(long, env = "ADMIN_ADDR", default_value = "127.0.0.1:5001")]
    pub admin_addr: SocketAddr,

    /// Bearer token required by the admin API.
    #[arg(long, env = "ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// MySQL host. When set, tickets are read from MySQL.
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    #[arg(long, env = "DB_PORT", default_value_t = 3306)]
    pub db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Schema holding the `tickets` table.
    #[arg(long, env = "DB_DATABASE", default_value = "tickets")]
    pub db_database: String,

    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// CSV export of issued tickets to load at startup (embedded stores only).
    #[arg(long, env = "SEED_FILE")]
    pub seed: Option<PathBuf>,

    /// Upper bound on a single ticket store call, in milliseconds.
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 5000)]
    pub store_timeout_ms: u64,
}

/// Connection parameters for the relational ticket store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub pool_size: u32,
}

/// Which ticket store the process should run against.
#[derive(Debug, Clone)]
pub enum Backend {
    MySql(DatabaseConfig),
    RocksDb(PathBuf),
    InMemory,
}

impl Cli {
    /// MySQL wins over RocksDB, which wins over the in-memory default.
    pub fn backend(&self) -> Backend {
        if let Some(host) = &self.db_host {
            return Backend::MySql(DatabaseConfig {
                host: host.clone(),
                port: self.db_port,
                user: self.db_user.clone(),
                password: self.db_password.clone(),
                database: self.db_database.clone(),
                pool_size: self.db_pool_size,
            });
        }
        match &self.db_path {
            Some(path) => Backend::RocksDb(path.clone()),
            None => Backend::InMemory,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
