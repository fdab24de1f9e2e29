use super::ticket::{PayeeDetails, Ticket, TicketNumber};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn find_by_number(&self, number: &TicketNumber) -> Result<Option<Ticket>>;

    /// Marks a ticket paid if, at write time, it is still an unpaid winner.
    ///
    /// Returns the number of tickets changed (0 or 1). Implementations must
    /// re-check the paid flag in the same atomic step as the write.
    async fn apply_payment(&self, number: &TicketNumber, details: &PayeeDetails) -> Result<u64>;
}

/// Outcome of the administrative schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaChange {
    Applied,
    AlreadyApplied,
    NotRequired,
}

/// Administrative operations. Only the admin router holds one of these.
#[async_trait]
pub trait SchemaAdmin: Send + Sync {
    async fn add_payee_columns(&self) -> Result<SchemaChange>;
}

pub type TicketStoreRef = Arc<dyn TicketStore>;
pub type SchemaAdminRef = Arc<dyn SchemaAdmin>;
