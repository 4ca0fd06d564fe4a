use async_trait::async_trait;
use tokio::sync::RwLock;

use skillgraph_application::JobBoardRepository;
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::{JobPosting, JobStatus};

/// In-memory job moderation queue.
#[derive(Debug, Default)]
pub struct InMemoryJobBoardRepository {
    jobs: RwLock<Vec<JobPosting>>,
}

impl InMemoryJobBoardRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl JobBoardRepository for InMemoryJobBoardRepository {
    async fn list_jobs(&self) -> AppResult<Vec<JobPosting>> {
        Ok(self.jobs.read().await.clone())
    }

    async fn insert_job(&self, job: JobPosting) -> AppResult<()> {
        let mut jobs = self.jobs.write().await;

        if jobs.iter().any(|stored| stored.id() == job.id()) {
            return Err(AppError::Conflict(format!(
                "job '{}' already exists",
                job.id()
            )));
        }

        jobs.push(job);
        Ok(())
    }

    async fn set_status(&self, id: &str, status: JobStatus) -> AppResult<JobPosting> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .iter_mut()
            .find(|job| job.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("job '{id}' does not exist")))?;
        job.set_status(status);
        Ok(job.clone())
    }
}

#[cfg(test)]
mod tests {
    use skillgraph_application::JobBoardRepository;
    use skillgraph_core::AppError;
    use skillgraph_domain::{JobPosting, JobStatus};

    use super::InMemoryJobBoardRepository;

    #[tokio::test]
    async fn moderation_decision_is_persisted() {
        let repository = InMemoryJobBoardRepository::new();
        let job = JobPosting::new("j1", "Frontend Engineer", "Acme", "Remote", 1_000)
            .unwrap_or_else(|_| unreachable!());
        let inserted = repository.insert_job(job).await;
        assert!(inserted.is_ok());

        let approved = repository.set_status("j1", JobStatus::Approved).await;
        assert!(approved.is_ok());

        let jobs = repository.list_jobs().await.unwrap_or_default();
        assert_eq!(jobs[0].status(), JobStatus::Approved);
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let repository = InMemoryJobBoardRepository::new();
        let result = repository.set_status("j9", JobStatus::Rejected).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
