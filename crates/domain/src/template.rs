use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// Scoring template families used by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    /// Skills-oriented factor analysis templates.
    #[serde(rename = "SOFA")]
    Sofa,
    /// Know-your-skills assessment templates.
    #[serde(rename = "KYS")]
    Kys,
}

impl TemplateKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sofa => "SOFA",
            Self::Kys => "KYS",
        }
    }
}

impl FromStr for TemplateKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "SOFA" => Ok(Self::Sofa),
            "KYS" => Ok(Self::Kys),
            _ => Err(AppError::Validation(format!(
                "unknown template kind '{value}'"
            ))),
        }
    }
}

/// One immutable revision in a template's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVersion {
    version: i32,
    body: String,
    created_at_ms: i64,
}

impl TemplateVersion {
    /// Returns the store-assigned version number.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Returns the revision payload.
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    /// Returns the creation timestamp in epoch milliseconds.
    #[must_use]
    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }
}

/// A scoring template with an append-only version history and one active
/// revision pointer.
///
/// Version numbers start at 1 and increase strictly; history is never
/// reordered or pruned, and `active_version` always names a version present
/// in `versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    id: String,
    name: String,
    kind: TemplateKind,
    active_version: i32,
    versions: Vec<TemplateVersion>,
}

impl Template {
    /// Creates a template with exactly one initial active version.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: TemplateKind,
        body: impl Into<String>,
        created_at_ms: i64,
    ) -> AppResult<Self> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(AppError::Validation(
                "template id must not be empty".to_owned(),
            ));
        }
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "template name must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            name,
            kind,
            active_version: 1,
            versions: vec![TemplateVersion {
                version: 1,
                body: body.into(),
                created_at_ms,
            }],
        })
    }

    /// Applies metadata changes; `None` fields are left untouched.
    pub fn update_metadata(
        &mut self,
        name: Option<String>,
        kind: Option<TemplateKind>,
    ) -> AppResult<()> {
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(
                    "template name must not be empty".to_owned(),
                ));
            }
            self.name = name;
        }
        if let Some(kind) = kind {
            self.kind = kind;
        }

        Ok(())
    }

    /// Appends a new revision and activates it, returning the assigned
    /// version number.
    ///
    /// A new revision supersedes prior ones until an explicit rollback, so
    /// append and activate are one fused step.
    pub fn append_version(&mut self, body: impl Into<String>, created_at_ms: i64) -> i32 {
        let next = self
            .versions
            .last()
            .map(|revision| revision.version + 1)
            .unwrap_or(1);
        self.versions.push(TemplateVersion {
            version: next,
            body: body.into(),
            created_at_ms,
        });
        self.active_version = next;
        next
    }

    /// Repoints the active revision to an existing version without touching
    /// history. Rolling back to the already-active version succeeds as a
    /// no-op.
    pub fn rollback_to(&mut self, version: i32) -> AppResult<()> {
        if !self
            .versions
            .iter()
            .any(|revision| revision.version == version)
        {
            return Err(AppError::VersionNotFound(format!(
                "template '{}' has no version {version}",
                self.id
            )));
        }

        self.active_version = version;
        Ok(())
    }

    /// Returns the stable template identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the template family.
    #[must_use]
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Returns the currently active version number.
    #[must_use]
    pub fn active_version(&self) -> i32 {
        self.active_version
    }

    /// Returns the full revision history in version order.
    #[must_use]
    pub fn versions(&self) -> &[TemplateVersion] {
        self.versions.as_slice()
    }
}
