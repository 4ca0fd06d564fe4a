use async_trait::async_trait;
use tokio::sync::RwLock;

use skillgraph_application::FlagRepository;
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::FeatureFlag;

/// In-memory feature flag store.
#[derive(Debug, Default)]
pub struct InMemoryFlagRepository {
    flags: RwLock<Vec<FeatureFlag>>,
}

impl InMemoryFlagRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FlagRepository for InMemoryFlagRepository {
    async fn list_flags(&self) -> AppResult<Vec<FeatureFlag>> {
        Ok(self.flags.read().await.clone())
    }

    async fn set_flag(&self, key: &str, enabled: bool) -> AppResult<FeatureFlag> {
        let mut flags = self.flags.write().await;

        if let Some(flag) = flags.iter_mut().find(|flag| flag.key() == key) {
            flag.set_enabled(enabled);
            return Ok(flag.clone());
        }

        let flag = FeatureFlag::new(key, enabled, None)?;
        flags.push(flag.clone());
        Ok(flag)
    }

    async fn insert_flag(&self, flag: FeatureFlag) -> AppResult<()> {
        let mut flags = self.flags.write().await;

        if flags.iter().any(|stored| stored.key() == flag.key()) {
            return Err(AppError::Conflict(format!(
                "flag '{}' already exists",
                flag.key()
            )));
        }

        flags.push(flag);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use skillgraph_application::FlagRepository;

    use super::InMemoryFlagRepository;

    #[tokio::test]
    async fn set_flag_creates_missing_flags() {
        let repository = InMemoryFlagRepository::new();

        let created = repository.set_flag("jobs.enabled", true).await;
        assert!(created.is_ok());

        let toggled = repository.set_flag("jobs.enabled", false).await;
        assert!(toggled.is_ok());
        assert!(!toggled.unwrap_or_else(|_| unreachable!()).enabled());

        assert_eq!(repository.list_flags().await.unwrap_or_default().len(), 1);
    }
}
