use crate::domain::ticket::{Ticket, TicketNumber};
use crate::error::{PayoutError, Result};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One row of an issuance export: `TicketNumber,Winner,Paid`.
#[derive(Debug, Deserialize)]
struct TicketRecord {
    #[serde(rename = "TicketNumber")]
    number: String,
    #[serde(rename = "Winner", deserialize_with = "deserialize_flag")]
    winner: bool,
    #[serde(rename = "Paid", deserialize_with = "deserialize_flag", default)]
    paid: bool,
}

/// Accepts the `0`/`1` flags of the tickets table as well as `true`/`false`.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid flag: {other}"))),
    }
}

impl TicketRecord {
    fn into_ticket(self) -> Result<Ticket> {
        let number = TicketNumber::parse(self.number)
            .map_err(|e| PayoutError::ValidationError(e.to_string()))?;
        let mut ticket = Ticket::new(number, self.winner);
        ticket.paid = self.paid;
        Ok(ticket)
    }
}

/// Reads issued tickets from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Ticket>`.
/// It trims whitespace and requires a header row.
pub struct TicketReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TicketReader<R> {
    /// Creates a new `TicketReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes tickets.
    pub fn tickets(self) -> impl Iterator<Item = Result<Ticket>> {
        self.reader
            .into_deserialize::<TicketRecord>()
            .map(|result| result.map_err(PayoutError::from).and_then(TicketRecord::into_ticket))
    }
}
