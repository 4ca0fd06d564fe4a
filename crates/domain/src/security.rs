use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skillgraph_core::AppError;

/// Console roles assignable to operator sessions.
///
/// A role is immutable once resolved for a session; changing it means
/// resolving a new caller identity, never mutating an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access to every admin surface.
    Admin,
    /// Manages users and the job moderation queue.
    Moderator,
    /// Read-only access plus analytics and the audit log.
    Analyst,
    /// Handles support tickets.
    Support,
    /// Read-only access to the console.
    Reader,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Analyst => "analyst",
            Self::Support => "support",
            Self::Reader => "reader",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Admin,
            Role::Moderator,
            Role::Analyst,
            Role::Support,
            Role::Reader,
        ];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "analyst" => Ok(Self::Analyst),
            "support" => Ok(Self::Support),
            "reader" => Ok(Self::Reader),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Capability verbs recognized in permission tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionVerb {
    /// Read access to a resource.
    Read,
    /// Create/update access to a resource.
    Write,
    /// Delete access to a resource.
    Delete,
}

impl PermissionVerb {
    /// Returns the verb segment used in permission tokens.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for PermissionVerb {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown permission verb '{value}'"
            ))),
        }
    }
}

/// Admin surfaces governed by permission tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Platform user directory.
    Users,
    /// Job posting moderation queue.
    Jobs,
    /// Versioned scoring templates.
    Templates,
    /// CMS articles.
    Cms,
    /// Support tickets.
    Tickets,
    /// Learning tracks.
    Tracks,
    /// Feature flags.
    Flags,
    /// Analytics views.
    Analytics,
    /// Audit log views.
    Audit,
}

impl Resource {
    /// Returns the resource segment used in permission tokens.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Jobs => "jobs",
            Self::Templates => "templates",
            Self::Cms => "cms",
            Self::Tickets => "tickets",
            Self::Tracks => "tracks",
            Self::Flags => "flags",
            Self::Analytics => "analytics",
            Self::Audit => "audit",
        }
    }
}

/// Atomic capability token of the canonical form `resource:verb`.
///
/// Tokens using the legacy dotted form `resource.verb` parse and normalize
/// to the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission {
    token: String,
    verb: PermissionVerb,
}

impl Permission {
    /// Creates a permission token from a known resource and verb.
    #[must_use]
    pub fn new(resource: Resource, verb: PermissionVerb) -> Self {
        Self {
            token: format!("{}:{}", resource.as_str(), verb.as_str()),
            verb,
        }
    }

    /// Parses a permission token, accepting both the canonical colon form
    /// and the legacy dotted form.
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let (resource, verb) = value
            .split_once(':')
            .or_else(|| value.split_once('.'))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "permission '{value}' must have the form 'resource:verb'"
                ))
            })?;

        if resource.is_empty() || resource.contains(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "permission '{value}' has a malformed resource segment"
            )));
        }

        let verb = PermissionVerb::from_str(verb)?;
        Ok(Self {
            token: format!("{resource}:{}", verb.as_str()),
            verb,
        })
    }

    /// Returns the resource segment of the token.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.token.split(':').next().unwrap_or_default()
    }

    /// Returns the verb segment of the token.
    #[must_use]
    pub fn verb(&self) -> PermissionVerb {
        self.verb
    }

    /// Produces the sibling token for another verb.
    ///
    /// This is a pure value transform on the token itself; it performs no
    /// role or grant lookup.
    #[must_use]
    pub fn with_verb(&self, verb: PermissionVerb) -> Self {
        Self {
            token: format!("{}:{}", self.resource(), verb.as_str()),
            verb,
        }
    }

    /// Returns the canonical token string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.token.as_str()
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.token
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.token)
    }
}

/// Stable audit actions emitted by admin use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a user's activation state changes.
    UserUpdated,
    /// Emitted when a user's platform roles are replaced.
    UserRolesSet,
    /// Emitted when a user is manually verified.
    UserVerified,
    /// Emitted when a user's onboarding is reset.
    UserOnboardingReset,
    /// Emitted when a job posting is approved.
    JobApproved,
    /// Emitted when a job posting is rejected.
    JobRejected,
    /// Emitted when a template is created.
    TemplateCreated,
    /// Emitted when template metadata changes.
    TemplateUpdated,
    /// Emitted when a template version is appended.
    TemplateVersionAdded,
    /// Emitted when a template is rolled back to a prior version.
    TemplateRolledBack,
    /// Emitted when a template and its history are deleted.
    TemplateDeleted,
    /// Emitted when a CMS article is created.
    ArticleCreated,
    /// Emitted when a CMS article is updated.
    ArticleUpdated,
    /// Emitted when a CMS article is deleted.
    ArticleDeleted,
    /// Emitted when a support ticket is created.
    TicketCreated,
    /// Emitted when a support ticket's status changes.
    TicketUpdated,
    /// Emitted when a support ticket is deleted.
    TicketDeleted,
    /// Emitted when a learning track is created.
    TrackCreated,
    /// Emitted when a learning track is renamed.
    TrackUpdated,
    /// Emitted when a step is added to a track.
    TrackStepAdded,
    /// Emitted when a step is removed from a track.
    TrackStepRemoved,
    /// Emitted when users are assigned to a track.
    TrackUsersAssigned,
    /// Emitted when a learning track is deleted.
    TrackDeleted,
    /// Emitted when a feature flag is toggled.
    FlagUpdated,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserUpdated => "users.update",
            Self::UserRolesSet => "users.set_roles",
            Self::UserVerified => "users.verify",
            Self::UserOnboardingReset => "users.reset_onboarding",
            Self::JobApproved => "jobs.approve",
            Self::JobRejected => "jobs.reject",
            Self::TemplateCreated => "templates.create",
            Self::TemplateUpdated => "templates.update",
            Self::TemplateVersionAdded => "templates.add_version",
            Self::TemplateRolledBack => "templates.rollback",
            Self::TemplateDeleted => "templates.delete",
            Self::ArticleCreated => "cms.create",
            Self::ArticleUpdated => "cms.update",
            Self::ArticleDeleted => "cms.delete",
            Self::TicketCreated => "support.create",
            Self::TicketUpdated => "support.update",
            Self::TicketDeleted => "support.delete",
            Self::TrackCreated => "tracks.create",
            Self::TrackUpdated => "tracks.update",
            Self::TrackStepAdded => "tracks.add_step",
            Self::TrackStepRemoved => "tracks.remove_step",
            Self::TrackUsersAssigned => "tracks.assign",
            Self::TrackDeleted => "tracks.delete",
            Self::FlagUpdated => "flags.update",
        }
    }
}

/// Resolved caller for one request: an actor label for audit attribution
/// and the role the session presented, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    subject: String,
    role: Option<Role>,
}

impl CallerIdentity {
    /// Creates a caller identity from resolved session data.
    #[must_use]
    pub fn new(subject: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    /// Creates an unauthenticated caller.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            subject: "anonymous".to_owned(),
            role: None,
        }
    }

    /// Returns the actor label used for audit attribution.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the resolved role, if the session presented a recognized one.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }
}
