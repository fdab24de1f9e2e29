//! Ticket model, payout verdicts and the storage ports the engine depends on.

pub mod outcome;
pub mod ports;
pub mod ticket;
