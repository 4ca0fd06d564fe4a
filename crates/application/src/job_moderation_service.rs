use std::sync::Arc;

use async_trait::async_trait;

use skillgraph_core::AppResult;
use skillgraph_domain::{
    AuditAction, CallerIdentity, JobPosting, JobStatus, Permission, PermissionVerb, Resource,
};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Repository port for the job moderation queue.
#[async_trait]
pub trait JobBoardRepository: Send + Sync {
    /// Lists all postings in submission order.
    async fn list_jobs(&self) -> AppResult<Vec<JobPosting>>;

    /// Stores a submitted posting.
    async fn insert_job(&self, job: JobPosting) -> AppResult<()>;

    /// Records a moderation decision on a posting.
    async fn set_status(&self, id: &str, status: JobStatus) -> AppResult<JobPosting>;
}

/// Application service for job board moderation.
#[derive(Clone)]
pub struct JobModerationService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn JobBoardRepository>,
    audit_trail: AuditTrailService,
}

const ENTITY: &str = "job";

impl JobModerationService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn JobBoardRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists the moderation queue.
    pub async fn list_jobs(&self, caller: &CallerIdentity) -> AppResult<Vec<JobPosting>> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Jobs, PermissionVerb::Read),
        )?;

        self.repository.list_jobs().await
    }

    /// Approves a posting for publication.
    pub async fn approve_job(&self, caller: &CallerIdentity, id: &str) -> AppResult<JobPosting> {
        self.moderate(caller, id, JobStatus::Approved, AuditAction::JobApproved)
            .await
    }

    /// Rejects a posting.
    pub async fn reject_job(&self, caller: &CallerIdentity, id: &str) -> AppResult<JobPosting> {
        self.moderate(caller, id, JobStatus::Rejected, AuditAction::JobRejected)
            .await
    }

    async fn moderate(
        &self,
        caller: &CallerIdentity,
        id: &str,
        status: JobStatus,
        action: AuditAction,
    ) -> AppResult<JobPosting> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Jobs, PermissionVerb::Write),
        )?;

        let job = self.repository.set_status(id, status).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action,
                entity: ENTITY.to_owned(),
                entity_id: job.id().to_owned(),
                metadata: None,
            })
            .await;

        Ok(job)
    }
}
