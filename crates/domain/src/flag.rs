use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// A named on/off switch for console behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlag {
    key: String,
    enabled: bool,
    description: Option<String>,
}

impl FeatureFlag {
    /// Creates a feature flag.
    pub fn new(
        key: impl Into<String>,
        enabled: bool,
        description: Option<String>,
    ) -> AppResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(AppError::Validation(
                "flag key must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            key,
            enabled,
            description,
        })
    }

    /// Returns the flag key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns whether the flag is on.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the optional human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Toggles the flag.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
