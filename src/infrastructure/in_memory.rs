use crate::domain::ports::{SchemaAdmin, SchemaChange, TicketStore};
use crate::domain::ticket::{PayeeDetails, Ticket, TicketNumber};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ticket store.
///
/// Uses `Arc<RwLock<HashMap<TicketNumber, Ticket>>>` so clones share the same
/// tickets. The payment update runs entirely under the write lock, which
/// makes the paid-flag check and the write a single step.
#[derive(Default, Clone)]
pub struct InMemoryTicketStore {
    tickets: Arc<RwLock<HashMap<TicketNumber, Ticket>>>,
}

impl InMemoryTicketStore {
    /// Creates a new, empty in-memory ticket store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads an issued ticket, replacing any ticket with the same number.
    pub async fn insert(&self, ticket: Ticket) {
        let mut tickets = self.tickets.write().await;
        tickets.insert(ticket.number.clone(), ticket);
    }

    pub async fn len(&self) -> usize {
        self.tickets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tickets.read().await.is_empty()
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn find_by_number(&self, number: &TicketNumber) -> Result<Option<Ticket>> {
        let tickets = self.tickets.read().await;
        Ok(tickets.get(number).cloned())
    }

    async fn apply_payment(&self, number: &TicketNumber, details: &PayeeDetails) -> Result<u64> {
        let mut tickets = self.tickets.write().await;
        let changed = tickets
            .get_mut(number)
            .is_some_and(|ticket| ticket.record_payment(details, Utc::now()));
        Ok(u64::from(changed))
    }
}

#[async_trait]
impl SchemaAdmin for InMemoryTicketStore {
    async fn add_payee_columns(&self) -> Result<SchemaChange> {
        Ok(SchemaChange::NotRequired)
    }
}
