use std::sync::Arc;

use async_trait::async_trait;

use skillgraph_core::AppResult;
use skillgraph_domain::{
    AuditAction, CallerIdentity, FeatureFlag, Permission, PermissionVerb, Resource,
};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Repository port for feature flags.
#[async_trait]
pub trait FlagRepository: Send + Sync {
    /// Lists all flags.
    async fn list_flags(&self) -> AppResult<Vec<FeatureFlag>>;

    /// Sets a flag, creating it when absent.
    async fn set_flag(&self, key: &str, enabled: bool) -> AppResult<FeatureFlag>;

    /// Stores a flag with its description.
    async fn insert_flag(&self, flag: FeatureFlag) -> AppResult<()>;
}

/// Application service for feature flag administration.
#[derive(Clone)]
pub struct FlagService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn FlagRepository>,
    audit_trail: AuditTrailService,
}

impl FlagService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn FlagRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists all flags.
    pub async fn list_flags(&self, caller: &CallerIdentity) -> AppResult<Vec<FeatureFlag>> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Flags, PermissionVerb::Read),
        )?;

        self.repository.list_flags().await
    }

    /// Toggles a flag, creating it when absent.
    pub async fn set_flag(
        &self,
        caller: &CallerIdentity,
        key: &str,
        enabled: bool,
    ) -> AppResult<FeatureFlag> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Flags, PermissionVerb::Write),
        )?;

        let flag = self.repository.set_flag(key, enabled).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::FlagUpdated,
                entity: "feature_flag".to_owned(),
                entity_id: flag.key().to_owned(),
                metadata: Some(serde_json::json!({ "enabled": enabled })),
            })
            .await;

        Ok(flag)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use skillgraph_core::{AppError, AppResult};
    use skillgraph_domain::{CallerIdentity, FeatureFlag, Role};

    use crate::{AuditTrailService, AuthorizationService, RoleGrants};

    use super::{FlagRepository, FlagService};

    #[derive(Default)]
    struct FakeFlagRepository {
        flags: Mutex<Vec<FeatureFlag>>,
    }

    #[async_trait]
    impl FlagRepository for FakeFlagRepository {
        async fn list_flags(&self) -> AppResult<Vec<FeatureFlag>> {
            Ok(self.flags.lock().await.clone())
        }

        async fn set_flag(&self, key: &str, enabled: bool) -> AppResult<FeatureFlag> {
            let mut flags = self.flags.lock().await;
            if let Some(flag) = flags.iter_mut().find(|flag| flag.key() == key) {
                flag.set_enabled(enabled);
                return Ok(flag.clone());
            }

            let flag = FeatureFlag::new(key, enabled, None)?;
            flags.push(flag.clone());
            Ok(flag)
        }

        async fn insert_flag(&self, flag: FeatureFlag) -> AppResult<()> {
            self.flags.lock().await.push(flag);
            Ok(())
        }
    }

    fn service() -> (FlagService, AuditTrailService) {
        let audit_trail = AuditTrailService::new(None, None);
        let service = FlagService::new(
            AuthorizationService::new(RoleGrants::builtin()),
            Arc::new(FakeFlagRepository::default()),
            audit_trail.clone(),
        );
        (service, audit_trail)
    }

    #[tokio::test]
    async fn toggling_a_flag_audits_once() {
        let (service, audit_trail) = service();
        let admin = CallerIdentity::new("admin", Some(Role::Admin));

        let flag = service.set_flag(&admin, "jobs.enabled", false).await;
        assert!(flag.is_ok());
        assert!(!flag.unwrap_or_else(|_| unreachable!()).enabled());

        let page = audit_trail.list(1, 50).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].action, "flags.update");
        assert_eq!(page.records[0].entity_id, "jobs.enabled");
    }

    #[tokio::test]
    async fn reader_can_list_but_not_toggle() {
        let (service, audit_trail) = service();
        let reader = CallerIdentity::new("reader", Some(Role::Reader));

        assert!(service.list_flags(&reader).await.is_ok());

        let result = service.set_flag(&reader, "jobs.enabled", true).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);
    }
}
