use std::sync::Arc;

use async_trait::async_trait;

use skillgraph_core::AppResult;
use skillgraph_domain::{
    AuditAction, CallerIdentity, ManagedUser, Permission, PermissionVerb, Resource,
};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Query parameters for directory listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    /// Optional case-insensitive name/email filter.
    pub search: Option<String>,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Maximum rows returned.
    pub limit: usize,
}

/// One page of directory users plus the filtered total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    /// Users for the requested page.
    pub users: Vec<ManagedUser>,
    /// Total number of users matching the filter.
    pub total: usize,
}

/// Repository port for the platform user directory.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Lists users matching the query.
    async fn list_users(&self, query: UserListQuery) -> AppResult<UserPage>;

    /// Finds one user by id.
    async fn find_user(&self, id: &str) -> AppResult<Option<ManagedUser>>;

    /// Stores a new user record.
    async fn insert_user(&self, user: ManagedUser) -> AppResult<()>;

    /// Sets a user's activation state.
    async fn set_active(&self, id: &str, active: bool) -> AppResult<ManagedUser>;

    /// Replaces a user's platform role list.
    async fn set_roles(&self, id: &str, roles: Vec<String>) -> AppResult<ManagedUser>;

    /// Marks a user as verified.
    async fn set_verified(&self, id: &str) -> AppResult<ManagedUser>;

    /// Resets a user's onboarding progress.
    async fn reset_onboarding(&self, id: &str) -> AppResult<ManagedUser>;
}

/// Application service for platform user administration.
#[derive(Clone)]
pub struct UserAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn DirectoryRepository>,
    audit_trail: AuditTrailService,
}

const ENTITY: &str = "user";

impl UserAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn DirectoryRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists directory users.
    pub async fn list_users(
        &self,
        caller: &CallerIdentity,
        query: UserListQuery,
    ) -> AppResult<UserPage> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Users, PermissionVerb::Read),
        )?;

        self.repository.list_users(query).await
    }

    /// Sets a user's activation state.
    pub async fn set_user_active(
        &self,
        caller: &CallerIdentity,
        id: &str,
        active: bool,
    ) -> AppResult<ManagedUser> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Users, PermissionVerb::Write),
        )?;

        let user = self.repository.set_active(id, active).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::UserUpdated,
                entity: ENTITY.to_owned(),
                entity_id: user.id().to_owned(),
                metadata: Some(serde_json::json!({ "active": active })),
            })
            .await;

        Ok(user)
    }

    /// Replaces a user's platform role list.
    pub async fn set_user_roles(
        &self,
        caller: &CallerIdentity,
        id: &str,
        roles: Vec<String>,
    ) -> AppResult<ManagedUser> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Users, PermissionVerb::Write),
        )?;

        let user = self.repository.set_roles(id, roles.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::UserRolesSet,
                entity: ENTITY.to_owned(),
                entity_id: user.id().to_owned(),
                metadata: Some(serde_json::json!({ "roles": roles })),
            })
            .await;

        Ok(user)
    }

    /// Manually verifies a user.
    pub async fn verify_user(&self, caller: &CallerIdentity, id: &str) -> AppResult<ManagedUser> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Users, PermissionVerb::Write),
        )?;

        let user = self.repository.set_verified(id).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::UserVerified,
                entity: ENTITY.to_owned(),
                entity_id: user.id().to_owned(),
                metadata: None,
            })
            .await;

        Ok(user)
    }

    /// Resets a user's onboarding progress.
    pub async fn reset_user_onboarding(
        &self,
        caller: &CallerIdentity,
        id: &str,
    ) -> AppResult<ManagedUser> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Users, PermissionVerb::Write),
        )?;

        let user = self.repository.reset_onboarding(id).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::UserOnboardingReset,
                entity: ENTITY.to_owned(),
                entity_id: user.id().to_owned(),
                metadata: None,
            })
            .await;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use skillgraph_core::{AppError, AppResult};
    use skillgraph_domain::{CallerIdentity, ManagedUser, Role};

    use crate::{AuditTrailService, AuthorizationService, RoleGrants};

    use super::{DirectoryRepository, UserAdminService, UserListQuery, UserPage};

    #[derive(Default)]
    struct FakeDirectoryRepository {
        users: Mutex<Vec<ManagedUser>>,
    }

    impl FakeDirectoryRepository {
        async fn update<F>(&self, id: &str, apply: F) -> AppResult<ManagedUser>
        where
            F: FnOnce(&mut ManagedUser),
        {
            let mut users = self.users.lock().await;
            let user = users
                .iter_mut()
                .find(|user| user.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("user '{id}' does not exist")))?;
            apply(user);
            Ok(user.clone())
        }
    }

    #[async_trait]
    impl DirectoryRepository for FakeDirectoryRepository {
        async fn list_users(&self, query: UserListQuery) -> AppResult<UserPage> {
            let users = self.users.lock().await.clone();
            let total = users.len();
            Ok(UserPage {
                users: users
                    .into_iter()
                    .skip(query.offset)
                    .take(query.limit)
                    .collect(),
                total,
            })
        }

        async fn find_user(&self, id: &str) -> AppResult<Option<ManagedUser>> {
            Ok(self
                .users
                .lock()
                .await
                .iter()
                .find(|user| user.id() == id)
                .cloned())
        }

        async fn insert_user(&self, user: ManagedUser) -> AppResult<()> {
            self.users.lock().await.push(user);
            Ok(())
        }

        async fn set_active(&self, id: &str, active: bool) -> AppResult<ManagedUser> {
            self.update(id, |user| user.set_active(active)).await
        }

        async fn set_roles(&self, id: &str, roles: Vec<String>) -> AppResult<ManagedUser> {
            self.update(id, |user| user.set_roles(roles)).await
        }

        async fn set_verified(&self, id: &str) -> AppResult<ManagedUser> {
            self.update(id, ManagedUser::mark_verified).await
        }

        async fn reset_onboarding(&self, id: &str) -> AppResult<ManagedUser> {
            self.update(id, ManagedUser::reset_onboarding).await
        }
    }

    async fn service_with_user() -> (UserAdminService, AuditTrailService) {
        let repository = Arc::new(FakeDirectoryRepository::default());
        let user = ManagedUser::new("u1", "Ava Patel", "ava@example.com");
        assert!(user.is_ok());
        let inserted = repository
            .insert_user(user.unwrap_or_else(|_| unreachable!()))
            .await;
        assert!(inserted.is_ok());

        let audit_trail = AuditTrailService::new(None, None);
        let service = UserAdminService::new(
            AuthorizationService::new(RoleGrants::builtin()),
            repository,
            audit_trail.clone(),
        );
        (service, audit_trail)
    }

    #[tokio::test]
    async fn support_cannot_mutate_users() {
        let (service, audit_trail) = service_with_user().await;
        let support = CallerIdentity::new("support", Some(Role::Support));

        let result = service.set_user_active(&support, "u1", false).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);

        // the read path stays open for support
        let listed = service
            .list_users(
                &support,
                UserListQuery {
                    search: None,
                    offset: 0,
                    limit: 20,
                },
            )
            .await;
        assert!(listed.is_ok());
        let listed = listed.unwrap_or_else(|_| unreachable!());
        assert!(listed.users[0].active());
    }

    #[tokio::test]
    async fn set_roles_audits_with_metadata() {
        let (service, audit_trail) = service_with_user().await;
        let moderator = CallerIdentity::new("moderator", Some(Role::Moderator));

        let result = service
            .set_user_roles(&moderator, "u1", vec!["mentor".to_owned()])
            .await;
        assert!(result.is_ok());

        let page = audit_trail.list(1, 50).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].action, "users.set_roles");
        assert_eq!(page.records[0].entity_id, "u1");
        assert_eq!(page.records[0].actor, "moderator");
    }

    #[tokio::test]
    async fn mutating_a_missing_user_is_not_found_and_unaudited() {
        let (service, audit_trail) = service_with_user().await;
        let admin = CallerIdentity::new("admin", Some(Role::Admin));

        let result = service.verify_user(&admin, "u9").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);
    }
}
