//! Application layer containing the payout orchestration.
//!
//! This module defines the `PayoutEngine`, the single entry point for ticket
//! validation and payment capture. It is shared by all requests and keeps no
//! mutable state of its own; every decision is made against the ticket store.

pub mod engine;
