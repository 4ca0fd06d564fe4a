use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// One step inside a learning track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStep {
    id: String,
    title: String,
    description: Option<String>,
}

impl TrackStep {
    /// Creates a track step.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        let id = id.into();
        let title = title.into();
        if id.trim().is_empty() || title.trim().is_empty() {
            return Err(AppError::Validation(
                "step id and title must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            title,
            description,
        })
    }

    /// Returns the stable step identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the step title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the optional step description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A curated learning track with ordered steps and assigned users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningTrack {
    id: String,
    name: String,
    steps: Vec<TrackStep>,
    assigned_user_ids: Vec<String>,
}

impl LearningTrack {
    /// Creates an empty learning track.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() || name.trim().is_empty() {
            return Err(AppError::Validation(
                "track id and name must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            name,
            steps: Vec::new(),
            assigned_user_ids: Vec::new(),
        })
    }

    /// Returns the stable track identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the track name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the ordered steps.
    #[must_use]
    pub fn steps(&self) -> &[TrackStep] {
        self.steps.as_slice()
    }

    /// Returns the assigned user ids.
    #[must_use]
    pub fn assigned_user_ids(&self) -> &[String] {
        self.assigned_user_ids.as_slice()
    }

    /// Renames the track.
    pub fn rename(&mut self, name: String) -> AppResult<()> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "track name must not be empty".to_owned(),
            ));
        }
        self.name = name;
        Ok(())
    }

    /// Appends a step to the track.
    pub fn add_step(&mut self, step: TrackStep) {
        self.steps.push(step);
    }

    /// Removes a step by id; removing a missing step is a no-op.
    pub fn remove_step(&mut self, step_id: &str) {
        self.steps.retain(|step| step.id() != step_id);
    }

    /// Assigns users to the track, skipping ids already assigned.
    pub fn assign_users(&mut self, user_ids: Vec<String>) {
        for user_id in user_ids {
            if !self.assigned_user_ids.contains(&user_id) {
                self.assigned_user_ids.push(user_id);
            }
        }
    }
}
