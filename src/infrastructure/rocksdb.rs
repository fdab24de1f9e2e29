use crate::domain::ports::{SchemaAdmin, SchemaChange, TicketStore};
use crate::domain::ticket::{PayeeDetails, Ticket, TicketNumber};
use crate::error::{PayoutError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing tickets, keyed by ticket number.
pub const CF_TICKETS: &str = "tickets";

/// A persistent ticket store implementation using RocksDB.
///
/// Tickets are stored as JSON in a dedicated Column Family. RocksDB has no
/// conditional put, so payment updates go through `write_gate`: the paid
/// flag is re-read and written while the gate is held.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_gate: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_tickets = ColumnFamilyDescriptor::new(CF_TICKETS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_tickets])?;

        Ok(Self {
            db: Arc::new(db),
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    /// Loads an issued ticket, replacing any ticket with the same number.
    pub async fn insert(&self, ticket: Ticket) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        self.put(&ticket)
    }

    fn put(&self, ticket: &Ticket) -> Result<()> {
        let cf = self.tickets_cf()?;
        let value = serde_json::to_vec(ticket)?;
        self.db.put_cf(cf, ticket.number.as_str().as_bytes(), value)?;
        Ok(())
    }

    fn read(&self, number: &TicketNumber) -> Result<Option<Ticket>> {
        let cf = self.tickets_cf()?;
        match self.db.get_pinned_cf(cf, number.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn tickets_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_TICKETS).ok_or_else(|| {
            PayoutError::InternalError("Tickets column family not found".to_string())
        })
    }
}

#[async_trait]
impl TicketStore for RocksDBStore {
    async fn find_by_number(&self, number: &TicketNumber) -> Result<Option<Ticket>> {
        self.read(number)
    }

    async fn apply_payment(&self, number: &TicketNumber, details: &PayeeDetails) -> Result<u64> {
        let _gate = self.write_gate.lock().await;

        let Some(mut ticket) = self.read(number)? else {
            return Ok(0);
        };
        if !ticket.record_payment(details, Utc::now()) {
            return Ok(0);
        }

        self.put(&ticket)?;
        Ok(1)
    }
}

#[async_trait]
impl SchemaAdmin for RocksDBStore {
    async fn add_payee_columns(&self) -> Result<SchemaChange> {
        Ok(SchemaChange::NotRequired)
    }
}
