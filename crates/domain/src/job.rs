use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// Moderation state of a submitted job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Awaiting a moderation decision.
    Pending,
    /// Published to the board.
    Approved,
    /// Withheld from the board.
    Rejected,
}

impl JobStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!("unknown job status '{value}'"))),
        }
    }
}

/// A job posting in the moderation queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    id: String,
    title: String,
    company: String,
    location: String,
    status: JobStatus,
    submitted_at_ms: i64,
}

impl JobPosting {
    /// Creates a pending job posting.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        submitted_at_ms: i64,
    ) -> AppResult<Self> {
        let id = id.into();
        let title = title.into();
        if id.trim().is_empty() || title.trim().is_empty() {
            return Err(AppError::Validation(
                "job id and title must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            title,
            company: company.into(),
            location: location.into(),
            status: JobStatus::Pending,
            submitted_at_ms,
        })
    }

    /// Returns the stable posting identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the posting title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the hiring company.
    #[must_use]
    pub fn company(&self) -> &str {
        self.company.as_str()
    }

    /// Returns the advertised location.
    #[must_use]
    pub fn location(&self) -> &str {
        self.location.as_str()
    }

    /// Returns the moderation state.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the submission timestamp in epoch milliseconds.
    #[must_use]
    pub fn submitted_at_ms(&self) -> i64 {
        self.submitted_at_ms
    }

    /// Records a moderation decision.
    pub fn set_status(&mut self, status: JobStatus) {
        self.status = status;
    }
}
