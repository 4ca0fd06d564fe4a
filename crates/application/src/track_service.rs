use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use skillgraph_core::AppResult;
use skillgraph_domain::{
    AuditAction, CallerIdentity, LearningTrack, Permission, PermissionVerb, Resource, TrackStep,
};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Repository port for learning tracks.
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Lists all tracks.
    async fn list_tracks(&self) -> AppResult<Vec<LearningTrack>>;

    /// Stores a new track.
    async fn insert_track(&self, track: LearningTrack) -> AppResult<()>;

    /// Renames a track.
    async fn rename_track(&self, id: &str, name: String) -> AppResult<LearningTrack>;

    /// Appends a step to a track.
    async fn add_step(&self, id: &str, step: TrackStep) -> AppResult<LearningTrack>;

    /// Removes a step from a track; removing a missing step is a no-op.
    async fn remove_step(&self, id: &str, step_id: &str) -> AppResult<LearningTrack>;

    /// Assigns users to a track, skipping ids already assigned.
    async fn assign_users(&self, id: &str, user_ids: Vec<String>) -> AppResult<LearningTrack>;

    /// Removes a track. Returns `false` when it does not exist.
    async fn delete_track(&self, id: &str) -> AppResult<bool>;
}

/// Application service for learning track administration.
#[derive(Clone)]
pub struct TrackService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn TrackRepository>,
    audit_trail: AuditTrailService,
}

const ENTITY: &str = "learning_track";

impl TrackService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn TrackRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists all tracks.
    pub async fn list_tracks(&self, caller: &CallerIdentity) -> AppResult<Vec<LearningTrack>> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Read),
        )?;

        self.repository.list_tracks().await
    }

    /// Creates an empty track.
    pub async fn create_track(
        &self,
        caller: &CallerIdentity,
        name: String,
    ) -> AppResult<LearningTrack> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Write),
        )?;

        let track = LearningTrack::new(format!("lt_{}", Uuid::new_v4().simple()), name)?;
        self.repository.insert_track(track.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TrackCreated,
                entity: ENTITY.to_owned(),
                entity_id: track.id().to_owned(),
                metadata: None,
            })
            .await;

        Ok(track)
    }

    /// Renames a track.
    pub async fn rename_track(
        &self,
        caller: &CallerIdentity,
        id: &str,
        name: String,
    ) -> AppResult<LearningTrack> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Write),
        )?;

        let track = self.repository.rename_track(id, name.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TrackUpdated,
                entity: ENTITY.to_owned(),
                entity_id: track.id().to_owned(),
                metadata: Some(serde_json::json!({ "name": name })),
            })
            .await;

        Ok(track)
    }

    /// Appends a step to a track.
    pub async fn add_track_step(
        &self,
        caller: &CallerIdentity,
        id: &str,
        title: String,
        description: Option<String>,
    ) -> AppResult<LearningTrack> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Write),
        )?;

        let step = TrackStep::new(format!("s_{}", Uuid::new_v4().simple()), title, description)?;
        let step_id = step.id().to_owned();
        let track = self.repository.add_step(id, step).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TrackStepAdded,
                entity: ENTITY.to_owned(),
                entity_id: track.id().to_owned(),
                metadata: Some(serde_json::json!({ "stepId": step_id })),
            })
            .await;

        Ok(track)
    }

    /// Removes a step from a track.
    pub async fn remove_track_step(
        &self,
        caller: &CallerIdentity,
        id: &str,
        step_id: &str,
    ) -> AppResult<LearningTrack> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Write),
        )?;

        let track = self.repository.remove_step(id, step_id).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TrackStepRemoved,
                entity: ENTITY.to_owned(),
                entity_id: track.id().to_owned(),
                metadata: Some(serde_json::json!({ "stepId": step_id })),
            })
            .await;

        Ok(track)
    }

    /// Assigns users to a track.
    pub async fn assign_track_users(
        &self,
        caller: &CallerIdentity,
        id: &str,
        user_ids: Vec<String>,
    ) -> AppResult<LearningTrack> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Write),
        )?;

        let track = self.repository.assign_users(id, user_ids.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::TrackUsersAssigned,
                entity: ENTITY.to_owned(),
                entity_id: track.id().to_owned(),
                metadata: Some(serde_json::json!({ "userIds": user_ids })),
            })
            .await;

        Ok(track)
    }

    /// Deletes a track. Returns `false` when it does not exist; nothing is
    /// audited in that case.
    pub async fn delete_track(&self, caller: &CallerIdentity, id: &str) -> AppResult<bool> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Tracks, PermissionVerb::Delete),
        )?;

        let removed = self.repository.delete_track(id).await?;
        if removed {
            self.audit_trail
                .record(AuditEntry {
                    actor: caller.subject().to_owned(),
                    action: AuditAction::TrackDeleted,
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
    use skillgraph_domain::{CallerIdentity, LearningTrack, Role, TrackStep};

    use crate::{AuditTrailService, AuthorizationService, RoleGrants};

    use super::{TrackRepository, TrackService};

    #[derive(Default)]
    struct FakeTrackRepository {
        tracks: Mutex<Vec<LearningTrack>>,
    }

    impl FakeTrackRepository {
        async fn update<F>(&self, id: &str, apply: F) -> AppResult<LearningTrack>
        where
            F: FnOnce(&mut LearningTrack) -> AppResult<()>,
        {
            let mut tracks = self.tracks.lock().await;
            let track = tracks
                .iter_mut()
                .find(|track| track.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("track '{id}' does not exist")))?;
            apply(track)?;
            Ok(track.clone())
        }
    }

    #[async_trait]
    impl TrackRepository for FakeTrackRepository {
        async fn list_tracks(&self) -> AppResult<Vec<LearningTrack>> {
            Ok(self.tracks.lock().await.clone())
        }

        async fn insert_track(&self, track: LearningTrack) -> AppResult<()> {
            self.tracks.lock().await.push(track);
            Ok(())
        }

        async fn rename_track(&self, id: &str, name: String) -> AppResult<LearningTrack> {
            self.update(id, |track| track.rename(name)).await
        }

        async fn add_step(&self, id: &str, step: TrackStep) -> AppResult<LearningTrack> {
            self.update(id, |track| {
                track.add_step(step);
                Ok(())
            })
            .await
        }

        async fn remove_step(&self, id: &str, step_id: &str) -> AppResult<LearningTrack> {
            self.update(id, |track| {
                track.remove_step(step_id);
                Ok(())
            })
            .await
        }

        async fn assign_users(&self, id: &str, user_ids: Vec<String>) -> AppResult<LearningTrack> {
            self.update(id, |track| {
                track.assign_users(user_ids);
                Ok(())
            })
            .await
        }

        async fn delete_track(&self, id: &str) -> AppResult<bool> {
            let mut tracks = self.tracks.lock().await;
            let before = tracks.len();
            tracks.retain(|track| track.id() != id);
            Ok(tracks.len() < before)
        }
    }

    fn service() -> (TrackService, AuditTrailService) {
        let audit_trail = AuditTrailService::new(None, None);
        let service = TrackService::new(
            AuthorizationService::new(RoleGrants::builtin()),
            Arc::new(FakeTrackRepository::default()),
            audit_trail.clone(),
        );
        (service, audit_trail)
    }

    #[tokio::test]
    async fn track_curation_audits_each_accepted_step() {
        let (service, audit_trail) = service();
        let admin = CallerIdentity::new("admin", Some(Role::Admin));

        let track = service
            .create_track(&admin, "Frontend Basics".to_owned())
            .await;
        assert!(track.is_ok());
        let track = track.unwrap_or_else(|_| unreachable!());

        let with_step = service
            .add_track_step(&admin, track.id(), "Intro to TypeScript".to_owned(), None)
            .await;
        assert!(with_step.is_ok());

        let assigned = service
            .assign_track_users(&admin, track.id(), vec!["u1".to_owned()])
            .await;
        assert!(assigned.is_ok());

        let page = audit_trail.list(1, 50).await;
        assert_eq!(page.total, 3);
        assert_eq!(page.records[0].action, "tracks.assign");
        assert_eq!(page.records[1].action, "tracks.add_step");
        assert_eq!(page.records[2].action, "tracks.create");
    }

    #[tokio::test]
    async fn moderator_cannot_curate_tracks() {
        let (service, audit_trail) = service();
        let moderator = CallerIdentity::new("moderator", Some(Role::Moderator));

        let result = service
            .create_track(&moderator, "Frontend Basics".to_owned())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);
    }
}
