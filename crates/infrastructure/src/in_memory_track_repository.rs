use async_trait::async_trait;
use tokio::sync::RwLock;

use skillgraph_application::TrackRepository;
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::{LearningTrack, TrackStep};

/// In-memory learning track store.
#[derive(Debug, Default)]
pub struct InMemoryTrackRepository {
    tracks: RwLock<Vec<LearningTrack>>,
}

impl InMemoryTrackRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracks: RwLock::new(Vec::new()),
        }
    }

    async fn update<F>(&self, id: &str, apply: F) -> AppResult<LearningTrack>
    where
        F: FnOnce(&mut LearningTrack) -> AppResult<()>,
    {
        let mut tracks = self.tracks.write().await;
        let track = tracks
            .iter_mut()
            .find(|track| track.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("track '{id}' does not exist")))?;
        apply(track)?;
        Ok(track.clone())
    }
}

#[async_trait]
impl TrackRepository for InMemoryTrackRepository {
    async fn list_tracks(&self) -> AppResult<Vec<LearningTrack>> {
        Ok(self.tracks.read().await.clone())
    }

    async fn insert_track(&self, track: LearningTrack) -> AppResult<()> {
        let mut tracks = self.tracks.write().await;

        if tracks.iter().any(|stored| stored.id() == track.id()) {
            return Err(AppError::Conflict(format!(
                "track '{}' already exists",
                track.id()
            )));
        }

        tracks.insert(0, track);
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
        let mut tracks = self.tracks.write().await;
        let before = tracks.len();
        tracks.retain(|track| track.id() != id);
        Ok(tracks.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use skillgraph_application::TrackRepository;
    use skillgraph_domain::{LearningTrack, TrackStep};

    use super::InMemoryTrackRepository;

    #[tokio::test]
    async fn steps_and_assignments_accumulate() {
        let repository = InMemoryTrackRepository::new();
        let track = LearningTrack::new("lt1", "Frontend Basics").unwrap_or_else(|_| unreachable!());
        let inserted = repository.insert_track(track).await;
        assert!(inserted.is_ok());

        let step = TrackStep::new("s1", "Intro to TypeScript", None)
            .unwrap_or_else(|_| unreachable!());
        let with_step = repository.add_step("lt1", step).await;
        assert!(with_step.is_ok());

        let assigned = repository
            .assign_users("lt1", vec!["u1".to_owned(), "u1".to_owned()])
            .await;
        assert!(assigned.is_ok());
        let assigned = assigned.unwrap_or_else(|_| unreachable!());
        assert_eq!(assigned.steps().len(), 1);
        assert_eq!(assigned.assigned_user_ids(), ["u1"]);
    }
}
