use super::ticket::Ticket;

/// Result of checking whether a ticket may be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    NotFound,
    NotAWinner,
    AlreadyPaid,
}

impl Verdict {
    /// Classifies a lookup result.
    ///
    /// Checked in order: existence, winner status, paid status. A losing
    /// ticket is `NotAWinner` even if its paid flag is set.
    pub fn classify(ticket: Option<&Ticket>) -> Self {
        match ticket {
            None => Verdict::NotFound,
            Some(ticket) if !ticket.winner => Verdict::NotAWinner,
            Some(ticket) if ticket.paid => Verdict::AlreadyPaid,
            Some(_) => Verdict::Eligible,
        }
    }
}

/// Result of a capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured,
    NotFound,
    NotAWinner,
    AlreadyPaid,
    /// Validation passed but another capture consumed the transition first.
    ConflictAlreadyProcessed,
}

impl CaptureOutcome {
    /// The rejection matching a verdict, or `None` when the ticket is eligible.
    pub fn rejection(verdict: Verdict) -> Option<Self> {
        match verdict {
            Verdict::Eligible => None,
            Verdict::NotFound => Some(CaptureOutcome::NotFound),
            Verdict::NotAWinner => Some(CaptureOutcome::NotAWinner),
            Verdict::AlreadyPaid => Some(CaptureOutcome::AlreadyPaid),
        }
    }
}
