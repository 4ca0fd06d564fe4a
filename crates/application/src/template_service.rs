use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use skillgraph_core::AppResult;
use skillgraph_domain::{
    AuditAction, CallerIdentity, Permission, PermissionVerb, Resource, Template, TemplateKind,
};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Input payload for template creation.
#[derive(Debug, Clone)]
pub struct CreateTemplateInput {
    /// Display name.
    pub name: String,
    /// Template family.
    pub kind: TemplateKind,
    /// Initial revision payload.
    pub body: String,
}

/// Repository port for versioned scoring templates.
///
/// Implementations must serialize mutation per entity so that version
/// numbers are assigned atomically: two concurrent appends on the same
/// template must never receive the same number or overwrite each other.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Stores a freshly created template.
    async fn insert(&self, template: Template) -> AppResult<()>;

    /// Lists all templates.
    async fn list(&self) -> AppResult<Vec<Template>>;

    /// Finds one template by id.
    async fn find(&self, id: &str) -> AppResult<Option<Template>>;

    /// Applies metadata changes to a template.
    async fn update_metadata(
        &self,
        id: &str,
        name: Option<String>,
        kind: Option<TemplateKind>,
    ) -> AppResult<Template>;

    /// Appends a new revision and activates it.
    ///
    /// Not idempotent: every call creates a new version, so a retried call
    /// appends again rather than deduplicating.
    async fn append_version(&self, id: &str, body: String) -> AppResult<Template>;

    /// Repoints the active revision to an existing version.
    async fn rollback(&self, id: &str, version: i32) -> AppResult<Template>;

    /// Removes a template and its entire history atomically. Returns
    /// `false` when the template does not exist.
    async fn delete(&self, id: &str) -> AppResult<bool>;
}

/// Application service for versioned template administration.
#[derive(Clone)]
pub struct TemplateService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn TemplateRepository>,
    audit_trail: AuditTrailService,
}

const ENTITY: &str = "template";

impl TemplateService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn TemplateRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists all templates.
    pub async fn list_templates(&self, caller: &CallerIdentity) -> AppResult<Vec<Template>> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Templates, PermissionVerb::Read),
        )?;

        self.repository.list().await
    }

    /// Creates a template with one initial active version.
    pub async fn create_template(
        &self,
        caller: &CallerIdentity,
        input: CreateTemplateInput,
    ) -> AppResult<Template> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Templates, PermissionVerb::Write),
        )?;

        let template = Template::new(
            format!("tmpl_{}", Uuid::new_v4().simple()),
            input.name,
            input.kind,
            input.body,
            Utc::now().timestamp_millis(),
        )?;
        self.repository.insert(template.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TemplateCreated,
                entity: ENTITY.to_owned(),
                entity_id: template.id().to_owned(),
                metadata: Some(serde_json::json!({ "kind": template.kind().as_str() })),
            })
            .await;

        Ok(template)
    }

    /// Updates template metadata.
    pub async fn update_template(
        &self,
        caller: &CallerIdentity,
        id: &str,
        name: Option<String>,
        kind: Option<TemplateKind>,
    ) -> AppResult<Template> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Templates, PermissionVerb::Write),
        )?;

        let template = self
            .repository
            .update_metadata(id, name.clone(), kind)
            .await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TemplateUpdated,
                entity: ENTITY.to_owned(),
                entity_id: template.id().to_owned(),
                metadata: Some(serde_json::json!({
                    "name": name,
                    "kind": kind.map(|kind| kind.as_str()),
                })),
            })
            .await;

        Ok(template)
    }

    /// Appends a new revision and activates it.
    pub async fn add_template_version(
        &self,
        caller: &CallerIdentity,
        id: &str,
        body: String,
    ) -> AppResult<Template> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Templates, PermissionVerb::Write),
        )?;

        let template = self.repository.append_version(id, body).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TemplateVersionAdded,
                entity: ENTITY.to_owned(),
                entity_id: template.id().to_owned(),
                metadata: Some(serde_json::json!({ "version": template.active_version() })),
            })
            .await;

        Ok(template)
    }

    /// Rolls the active revision back to an existing version.
    pub async fn rollback_template(
        &self,
        caller: &CallerIdentity,
        id: &str,
        version: i32,
    ) -> AppResult<Template> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Templates, PermissionVerb::Write),
        )?;

        let template = self.repository.rollback(id, version).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TemplateRolledBack,
                entity: ENTITY.to_owned(),
                entity_id: template.id().to_owned(),
                metadata: Some(serde_json::json!({ "version": version })),
            })
            .await;

        Ok(template)
    }

    /// Deletes a template and its entire history. Returns `false` when the
    /// template does not exist; nothing is audited in that case.
    pub async fn delete_template(&self, caller: &CallerIdentity, id: &str) -> AppResult<bool> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Templates, PermissionVerb::Delete),
        )?;

        let removed = self.repository.delete(id).await?;
        if removed {
            self.audit_trail
                .record(AuditEntry {
                    actor: caller.subject().to_owned(),
                    action: AuditAction::TemplateDeleted,
                    entity: ENTITY.to_owned(),
                    entity_id: id.to_owned(),
                    metadata: None,
                })
                .await;
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use skillgraph_core::{AppError, AppResult};
    use skillgraph_domain::{CallerIdentity, Role, Template, TemplateKind};

    use crate::{AuditTrailService, AuthorizationService, RoleGrants};

    use super::{CreateTemplateInput, TemplateRepository, TemplateService};

    #[derive(Default)]
    struct FakeTemplateRepository {
        templates: Mutex<Vec<Template>>,
    }

    #[async_trait]
    impl TemplateRepository for FakeTemplateRepository {
        async fn insert(&self, template: Template) -> AppResult<()> {
            self.templates.lock().await.push(template);
            Ok(())
        }

        async fn list(&self) -> AppResult<Vec<Template>> {
            Ok(self.templates.lock().await.clone())
        }

        async fn find(&self, id: &str) -> AppResult<Option<Template>> {
            Ok(self
                .templates
                .lock()
                .await
                .iter()
                .find(|template| template.id() == id)
                .cloned())
        }

        async fn update_metadata(
            &self,
            id: &str,
            name: Option<String>,
            kind: Option<TemplateKind>,
        ) -> AppResult<Template> {
            let mut templates = self.templates.lock().await;
            let template = templates
                .iter_mut()
                .find(|template| template.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("template '{id}' does not exist")))?;
            template.update_metadata(name, kind)?;
            Ok(template.clone())
        }

        async fn append_version(&self, id: &str, body: String) -> AppResult<Template> {
            let mut templates = self.templates.lock().await;
            let template = templates
                .iter_mut()
                .find(|template| template.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("template '{id}' does not exist")))?;
            template.append_version(body, 0);
            Ok(template.clone())
        }

        async fn rollback(&self, id: &str, version: i32) -> AppResult<Template> {
            let mut templates = self.templates.lock().await;
            let template = templates
                .iter_mut()
                .find(|template| template.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("template '{id}' does not exist")))?;
            template.rollback_to(version)?;
            Ok(template.clone())
        }

        async fn delete(&self, id: &str) -> AppResult<bool> {
            let mut templates = self.templates.lock().await;
            let before = templates.len();
            templates.retain(|template| template.id() != id);
            Ok(templates.len() < before)
        }
    }

    fn service() -> (TemplateService, AuditTrailService) {
        let audit_trail = AuditTrailService::new(None, None);
        let service = TemplateService::new(
            AuthorizationService::new(RoleGrants::builtin()),
            Arc::new(FakeTemplateRepository::default()),
            audit_trail.clone(),
        );
        (service, audit_trail)
    }

    fn admin() -> CallerIdentity {
        CallerIdentity::new("admin", Some(Role::Admin))
    }

    #[tokio::test]
    async fn create_template_requires_write_permission() {
        let (service, audit_trail) = service();
        let reader = CallerIdentity::new("reader", Some(Role::Reader));

        let result = service
            .create_template(
                &reader,
                CreateTemplateInput {
                    name: "Default SOFA".to_owned(),
                    kind: TemplateKind::Sofa,
                    body: "{}".to_owned(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);
        assert!(
            service
                .list_templates(&reader)
                .await
                .unwrap_or_default()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn accepted_mutations_audit_exactly_once() {
        let (service, audit_trail) = service();
        let admin = admin();

        let template = service
            .create_template(
                &admin,
                CreateTemplateInput {
                    name: "Default SOFA".to_owned(),
                    kind: TemplateKind::Sofa,
                    body: "{ \"score\": \"sum(weights)\" }".to_owned(),
                },
            )
            .await;
        assert!(template.is_ok());
        let template = template.unwrap_or_else(|_| unreachable!());
        assert_eq!(audit_trail.list(1, 50).await.total, 1);

        let appended = service
            .add_template_version(&admin, template.id(), "{ \"score\": 2 }".to_owned())
            .await;
        assert!(appended.is_ok());
        let appended = appended.unwrap_or_else(|_| unreachable!());
        assert_eq!(appended.active_version(), 2);

        let rolled_back = service.rollback_template(&admin, template.id(), 1).await;
        assert!(rolled_back.is_ok());
        let rolled_back = rolled_back.unwrap_or_else(|_| unreachable!());
        assert_eq!(rolled_back.active_version(), 1);
        assert_eq!(rolled_back.versions().len(), 2);

        let page = audit_trail.list(1, 50).await;
        assert_eq!(page.total, 3);
        assert_eq!(page.records[0].action, "templates.rollback");
        assert_eq!(page.records[0].entity_id, template.id());
    }

    #[tokio::test]
    async fn rollback_to_missing_version_is_distinct_from_not_found() {
        let (service, audit_trail) = service();
        let admin = admin();

        let template = service
            .create_template(
                &admin,
                CreateTemplateInput {
                    name: "Default SOFA".to_owned(),
                    kind: TemplateKind::Sofa,
                    body: "{}".to_owned(),
                },
            )
            .await
            .unwrap_or_else(|_| unreachable!());

        let missing_version = service.rollback_template(&admin, template.id(), 9).await;
        assert!(matches!(
            missing_version,
            Err(AppError::VersionNotFound(_))
        ));

        let missing_template = service.rollback_template(&admin, "tmpl_missing", 1).await;
        assert!(matches!(missing_template, Err(AppError::NotFound(_))));

        // only the create was audited
        assert_eq!(audit_trail.list(1, 50).await.total, 1);
    }

    #[tokio::test]
    async fn delete_of_missing_template_returns_false_without_audit() {
        let (service, audit_trail) = service();

        let removed = service.delete_template(&admin(), "tmpl_missing").await;
        assert!(removed.is_ok());
        assert!(!removed.unwrap_or(true));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);
    }
}
