use crate::domain::outcome::{CaptureOutcome, Verdict};
use crate::domain::ports::TicketStoreRef;
use crate::domain::ticket::{PayeeDetails, TicketNumber};
use crate::error::{PayoutFailure, Result as StoreResult};
use std::future::Future;
use std::time::Duration;

/// Default bound on a single ticket store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Validates tickets and captures payouts.
///
/// The engine owns a shared handle to the ticket store and nothing else.
/// The only synchronization between concurrent captures is the store's
/// conditional update, so the engine can be cloned freely behind an `Arc`.
pub struct PayoutEngine {
    store: TicketStoreRef,
    store_timeout: Duration,
}

impl PayoutEngine {
    /// Creates a new `PayoutEngine` using the default store timeout.
    pub fn new(store: TicketStoreRef) -> Self {
        Self::with_timeout(store, DEFAULT_STORE_TIMEOUT)
    }

    /// Creates a new `PayoutEngine`.
    ///
    /// # Arguments
    ///
    /// * `store` - The ticket store, shared process-wide.
    /// * `store_timeout` - Upper bound on each store call.
    pub fn with_timeout(store: TicketStoreRef, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Classifies a ticket with a single store lookup.
    #[tracing::instrument(skip(self, number), fields(ticket = %number))]
    pub async fn validate(&self, number: &TicketNumber) -> Result<Verdict, PayoutFailure> {
        let ticket = self
            .bounded("find_by_number", self.store.find_by_number(number))
            .await?;
        let verdict = Verdict::classify(ticket.as_ref());
        tracing::debug!(?verdict, "ticket validated");
        Ok(verdict)
    }

    /// Records payee details against an eligible ticket and marks it paid.
    ///
    /// Rejections leave storage untouched. A lost race against another
    /// capture is reported as `ConflictAlreadyProcessed`.
    #[tracing::instrument(skip(self, number, details), fields(ticket = %number))]
    pub async fn capture_payment(
        &self,
        number: &TicketNumber,
        details: PayeeDetails,
    ) -> Result<CaptureOutcome, PayoutFailure> {
        details.ensure_complete()?;

        if let Some(rejection) = CaptureOutcome::rejection(self.validate(number).await?) {
            tracing::debug!(outcome = ?rejection, "capture rejected");
            return Ok(rejection);
        }

        let affected = self
            .bounded("apply_payment", self.store.apply_payment(number, &details))
            .await?;

        if affected == 0 {
            tracing::info!("capture lost to a concurrent payment");
            return Ok(CaptureOutcome::ConflictAlreadyProcessed);
        }

        tracing::info!(
            amount_paid = %details.amount_paid,
            method = %details.method,
            "payout captured"
        );
        Ok(CaptureOutcome::Captured)
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Result<T, PayoutFailure> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(operation, error = %e, "ticket store call failed");
                Err(PayoutFailure::StorageUnavailable)
            }
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "ticket store call timed out"
                );
                Err(PayoutFailure::StorageUnavailable)
            }
        }
    }
}
