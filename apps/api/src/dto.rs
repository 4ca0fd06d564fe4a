use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillgraph_application::{AuditPage, AuditRecord, UserPage};
use skillgraph_domain::{
    Article, FeatureFlag, JobPosting, LearningTrack, ManagedUser, Template, TemplateVersion,
    Ticket, TrackStep,
};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the resolved caller and their capabilities.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub role: Option<String>,
    pub permissions: Vec<String>,
    pub read_only: bool,
}

/// API representation of a directory user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub verified: bool,
    pub onboarding_complete: bool,
    pub roles: Vec<String>,
}

impl From<ManagedUser> for UserResponse {
    fn from(user: ManagedUser) -> Self {
        Self {
            id: user.id().to_owned(),
            name: user.name().to_owned(),
            email: user.email().to_owned(),
            active: user.active(),
            verified: user.verified(),
            onboarding_complete: user.onboarding_complete(),
            roles: user.roles().to_vec(),
        }
    }
}

/// One page of directory users.
#[derive(Debug, Serialize)]
pub struct UserPageResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

impl From<UserPage> for UserPageResponse {
    fn from(page: UserPage) -> Self {
        Self {
            users: page.users.into_iter().map(UserResponse::from).collect(),
            total: page.total,
        }
    }
}

/// Query parameters for directory listings.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub q: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Incoming payload for user activation changes.
#[derive(Debug, Deserialize)]
pub struct SetUserActiveRequest {
    pub active: bool,
}

/// Incoming payload for replacing a user's platform roles.
#[derive(Debug, Deserialize)]
pub struct SetUserRolesRequest {
    pub roles: Vec<String>,
}

/// API representation of a job posting.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub status: String,
    pub submitted_at_ms: i64,
}

impl From<JobPosting> for JobResponse {
    fn from(job: JobPosting) -> Self {
        Self {
            id: job.id().to_owned(),
            title: job.title().to_owned(),
            company: job.company().to_owned(),
            location: job.location().to_owned(),
            status: job.status().as_str().to_owned(),
            submitted_at_ms: job.submitted_at_ms(),
        }
    }
}

/// API representation of one template revision.
#[derive(Debug, Serialize)]
pub struct TemplateVersionResponse {
    pub version: i32,
    pub body: String,
    pub created_at_ms: i64,
}

impl From<&TemplateVersion> for TemplateVersionResponse {
    fn from(revision: &TemplateVersion) -> Self {
        Self {
            version: revision.version(),
            body: revision.body().to_owned(),
            created_at_ms: revision.created_at_ms(),
        }
    }
}

/// API representation of a versioned template.
#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub active_version: i32,
    pub versions: Vec<TemplateVersionResponse>,
}

impl From<Template> for TemplateResponse {
    fn from(template: Template) -> Self {
        Self {
            id: template.id().to_owned(),
            name: template.name().to_owned(),
            kind: template.kind().as_str().to_owned(),
            active_version: template.active_version(),
            versions: template
                .versions()
                .iter()
                .map(TemplateVersionResponse::from)
                .collect(),
        }
    }
}

/// Incoming payload for template creation.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub kind: String,
    pub body: String,
}

/// Incoming payload for template metadata changes.
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub kind: Option<String>,
}

/// Incoming payload for appending a template version.
#[derive(Debug, Deserialize)]
pub struct AddTemplateVersionRequest {
    pub body: String,
}

/// Incoming payload for template rollback.
#[derive(Debug, Deserialize)]
pub struct RollbackTemplateRequest {
    pub version: i32,
}

/// API representation of a CMS article.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub updated_at_ms: i64,
}

impl From<Article> for ArticleResponse {
    fn from(article: Article) -> Self {
        Self {
            id: article.id().to_owned(),
            title: article.title().to_owned(),
            slug: article.slug().to_owned(),
            content: article.content().to_owned(),
            updated_at_ms: article.updated_at_ms(),
        }
    }
}

/// Incoming payload for article creation.
#[derive(Debug, Deserialize)]
pub struct CreateArticleRequest {
    pub title: String,
    pub slug: String,
    pub content: String,
}

/// Incoming payload for article changes.
#[derive(Debug, Deserialize)]
pub struct UpdateArticleRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
}

/// API representation of a support ticket.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: String,
    pub subject: String,
    pub requester_email: String,
    pub status: String,
    pub created_at_ms: i64,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id().to_owned(),
            subject: ticket.subject().to_owned(),
            requester_email: ticket.requester_email().to_owned(),
            status: ticket.status().as_str().to_owned(),
            created_at_ms: ticket.created_at_ms(),
        }
    }
}

/// Incoming payload for ticket creation.
#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub subject: String,
    pub requester_email: String,
}

/// Incoming payload for ticket status changes.
#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub status: String,
}

/// API representation of a track step.
#[derive(Debug, Serialize)]
pub struct TrackStepResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

impl From<&TrackStep> for TrackStepResponse {
    fn from(step: &TrackStep) -> Self {
        Self {
            id: step.id().to_owned(),
            title: step.title().to_owned(),
            description: step.description().map(str::to_owned),
        }
    }
}

/// API representation of a learning track.
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: String,
    pub name: String,
    pub steps: Vec<TrackStepResponse>,
    pub assigned_user_ids: Vec<String>,
}

impl From<LearningTrack> for TrackResponse {
    fn from(track: LearningTrack) -> Self {
        Self {
            id: track.id().to_owned(),
            name: track.name().to_owned(),
            steps: track.steps().iter().map(TrackStepResponse::from).collect(),
            assigned_user_ids: track.assigned_user_ids().to_vec(),
        }
    }
}

/// Incoming payload for track creation.
#[derive(Debug, Deserialize)]
pub struct CreateTrackRequest {
    pub name: String,
}

/// Incoming payload for track rename.
#[derive(Debug, Deserialize)]
pub struct UpdateTrackRequest {
    pub name: String,
}

/// Incoming payload for adding a track step.
#[derive(Debug, Deserialize)]
pub struct AddTrackStepRequest {
    pub title: String,
    pub description: Option<String>,
}

/// Incoming payload for assigning users to a track.
#[derive(Debug, Deserialize)]
pub struct AssignTrackUsersRequest {
    pub user_ids: Vec<String>,
}

/// API representation of a feature flag.
#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub key: String,
    pub enabled: bool,
    pub description: Option<String>,
}

impl From<FeatureFlag> for FlagResponse {
    fn from(flag: FeatureFlag) -> Self {
        Self {
            key: flag.key().to_owned(),
            enabled: flag.enabled(),
            description: flag.description().map(str::to_owned),
        }
    }
}

/// Incoming payload for toggling a feature flag.
#[derive(Debug, Deserialize)]
pub struct SetFlagRequest {
    pub key: String,
    pub enabled: bool,
}

/// API representation of one audit record.
#[derive(Debug, Serialize)]
pub struct AuditRecordResponse {
    pub id: String,
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub timestamp_ms: i64,
    pub metadata: Option<Value>,
}

impl From<AuditRecord> for AuditRecordResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            id: record.id,
            actor: record.actor,
            action: record.action,
            entity: record.entity,
            entity_id: record.entity_id,
            timestamp_ms: record.timestamp_ms,
            metadata: record.metadata,
        }
    }
}

/// One newest-first page of audit records.
#[derive(Debug, Serialize)]
pub struct AuditPageResponse {
    pub records: Vec<AuditRecordResponse>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl AuditPageResponse {
    /// Builds the response from a trail page plus the effective paging.
    #[must_use]
    pub fn from_page(page: AuditPage, page_number: usize, page_size: usize) -> Self {
        Self {
            records: page
                .records
                .into_iter()
                .map(AuditRecordResponse::from)
                .collect(),
            total: page.total,
            page: page_number,
            page_size,
        }
    }
}

/// Query parameters for audit log listing.
#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}
