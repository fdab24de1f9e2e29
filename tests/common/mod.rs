#![allow(dead_code)]

use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use ticket_payout::application::engine::PayoutEngine;
use ticket_payout::domain::ticket::{Ticket, TicketNumber};
use ticket_payout::infrastructure::in_memory::InMemoryTicketStore;

pub fn number(raw: &str) -> TicketNumber {
    TicketNumber::parse(raw).unwrap()
}

/// Builds a store holding `(number, winner, paid)` tickets.
pub async fn seeded_store(tickets: &[(&str, bool, bool)]) -> InMemoryTicketStore {
    let store = InMemoryTicketStore::new();
    for (raw, winner, paid) in tickets {
        let mut ticket = Ticket::new(number(raw), *winner);
        ticket.paid = *paid;
        store.insert(ticket).await;
    }
    store
}

pub fn engine_for(store: &InMemoryTicketStore) -> Arc<PayoutEngine> {
    Arc::new(PayoutEngine::new(Arc::new(store.clone())))
}

pub fn write_seed_csv(path: &Path, rows: &[(&str, &str, &str)]) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "TicketNumber,Winner,Paid")?;
    for (number, winner, paid) in rows {
        writeln!(file, "{number},{winner},{paid}")?;
    }
    Ok(())
}
