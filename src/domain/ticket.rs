use crate::error::PayoutFailure;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier printed on a ticket.
///
/// Any non-blank string is accepted verbatim; numbers are assigned at
/// issuance and never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(String);

impl TicketNumber {
    pub fn parse(raw: impl Into<String>) -> Result<Self, PayoutFailure> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(PayoutFailure::MalformedInput(
                "ticket number is required".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payee information supplied by the payout counter at capture time.
///
/// Only `amount_paid` and `method` are mandatory. The amount is recorded as
/// given; matching it against a prize table is the draw system's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayeeDetails {
    pub surname: Option<String>,
    pub first_name: Option<String>,
    pub phone_number: Option<String>,
    pub phone_network: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub amount_paid: Decimal,
    pub method: String,
}

impl PayeeDetails {
    /// Details carrying only the mandatory fields.
    pub fn new(amount_paid: Decimal, method: impl Into<String>) -> Self {
        Self {
            surname: None,
            first_name: None,
            phone_number: None,
            phone_network: None,
            id_type: None,
            id_number: None,
            amount_paid,
            method: method.into(),
        }
    }

    pub fn ensure_complete(&self) -> Result<(), PayoutFailure> {
        if self.method.trim().is_empty() {
            return Err(PayoutFailure::MalformedInput(
                "payment method is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a paid ticket carries: the payee details plus the store's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub details: PayeeDetails,
    pub paid_at: DateTime<Utc>,
}

/// A ticket as seen by the payout core.
///
/// `winner` is fixed by the draw. `paid` only ever moves from `false` to
/// `true`, and `payout` is written in the same step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub number: TicketNumber,
    pub winner: bool,
    pub paid: bool,
    #[serde(default)]
    pub payout: Option<Payout>,
}

impl Ticket {
    pub fn new(number: TicketNumber, winner: bool) -> Self {
        Self {
            number,
            winner,
            paid: false,
            payout: None,
        }
    }

    /// Whether `apply_payment` may still transition this ticket.
    pub fn is_payable(&self) -> bool {
        self.winner && !self.paid
    }

    /// Marks the ticket paid. Returns `false` and leaves the ticket untouched
    /// if it is not payable.
    pub fn record_payment(&mut self, details: &PayeeDetails, paid_at: DateTime<Utc>) -> bool {
        if !self.is_payable() {
            return false;
        }
        self.paid = true;
        self.payout = Some(Payout {
            details: details.clone(),
            paid_at,
        });
        true
    }
}
