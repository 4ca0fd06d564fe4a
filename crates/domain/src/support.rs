use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// Workflow state of a support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly filed, awaiting triage.
    Open,
    /// Waiting on the requester or a third party.
    Pending,
    /// Closed out.
    Resolved,
}

impl TicketStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            _ => Err(AppError::Validation(format!(
                "unknown ticket status '{value}'"
            ))),
        }
    }
}

/// A support ticket filed by a platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: String,
    subject: String,
    requester_email: String,
    status: TicketStatus,
    created_at_ms: i64,
}

impl Ticket {
    /// Creates an open ticket.
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        requester_email: impl Into<String>,
        created_at_ms: i64,
    ) -> AppResult<Self> {
        let id = id.into();
        let subject = subject.into();
        let requester_email = requester_email.into();
        if id.trim().is_empty() || subject.trim().is_empty() {
            return Err(AppError::Validation(
                "ticket id and subject must not be empty".to_owned(),
            ));
        }
        if !requester_email.contains('@') {
            return Err(AppError::Validation(format!(
                "requester email '{requester_email}' is malformed"
            )));
        }

        Ok(Self {
            id,
            subject,
            requester_email,
            status: TicketStatus::Open,
            created_at_ms,
        })
    }

    /// Returns the stable ticket identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the ticket subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the requester's email address.
    #[must_use]
    pub fn requester_email(&self) -> &str {
        self.requester_email.as_str()
    }

    /// Returns the workflow state.
    #[must_use]
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the creation timestamp in epoch milliseconds.
    #[must_use]
    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// Moves the ticket to another workflow state.
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
    }
}
