use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use skillgraph_application::TemplateRepository;
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::{Template, TemplateKind};

/// In-memory template repository implementation.
///
/// Every mutation runs under the store's write lock, which is the atomic
/// serializing step for version-number assignment: two concurrent appends
/// on the same template observe the lock in sequence and can never share a
/// version number.
#[derive(Debug, Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<Vec<Template>>,
}

impl InMemoryTemplateRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(Vec::new()),
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("template '{id}' does not exist"))
}

#[async_trait]
impl TemplateRepository for InMemoryTemplateRepository {
    async fn insert(&self, template: Template) -> AppResult<()> {
        let mut templates = self.templates.write().await;

        if templates.iter().any(|stored| stored.id() == template.id()) {
            return Err(AppError::Conflict(format!(
                "template '{}' already exists",
                template.id()
            )));
        }

        templates.insert(0, template);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Template>> {
        Ok(self.templates.read().await.clone())
    }

    async fn find(&self, id: &str) -> AppResult<Option<Template>> {
        Ok(self
            .templates
            .read()
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
        let mut templates = self.templates.write().await;
        let template = templates
            .iter_mut()
            .find(|template| template.id() == id)
            .ok_or_else(|| not_found(id))?;

        template.update_metadata(name, kind)?;
        Ok(template.clone())
    }

    async fn append_version(&self, id: &str, body: String) -> AppResult<Template> {
        let mut templates = self.templates.write().await;
        let template = templates
            .iter_mut()
            .find(|template| template.id() == id)
            .ok_or_else(|| not_found(id))?;

        template.append_version(body, Utc::now().timestamp_millis());
        Ok(template.clone())
    }

    async fn rollback(&self, id: &str, version: i32) -> AppResult<Template> {
        let mut templates = self.templates.write().await;
        let template = templates
            .iter_mut()
            .find(|template| template.id() == id)
            .ok_or_else(|| not_found(id))?;

        template.rollback_to(version)?;
        Ok(template.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let mut templates = self.templates.write().await;
        let before = templates.len();
        templates.retain(|template| template.id() != id);
        Ok(templates.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use skillgraph_application::TemplateRepository;
    use skillgraph_core::AppError;
    use skillgraph_domain::{Template, TemplateKind};

    use super::InMemoryTemplateRepository;

    async fn repository_with_template(id: &str) -> InMemoryTemplateRepository {
        let repository = InMemoryTemplateRepository::new();
        let template = Template::new(id, "Default SOFA", TemplateKind::Sofa, "B1", 1_000);
        assert!(template.is_ok());
        let inserted = repository
            .insert(template.unwrap_or_else(|_| unreachable!()))
            .await;
        assert!(inserted.is_ok());
        repository
    }

    #[tokio::test]
    async fn create_append_rollback_keeps_history_intact() {
        let repository = repository_with_template("t1").await;

        let appended = repository.append_version("t1", "B2".to_owned()).await;
        assert!(appended.is_ok());
        let appended = appended.unwrap_or_else(|_| unreachable!());
        assert_eq!(appended.active_version(), 2);
        assert_eq!(appended.versions().len(), 2);
        assert_eq!(appended.versions()[0].body(), "B1");
        assert_eq!(appended.versions()[1].body(), "B2");

        let rolled_back = repository.rollback("t1", 1).await;
        assert!(rolled_back.is_ok());
        let rolled_back = rolled_back.unwrap_or_else(|_| unreachable!());
        assert_eq!(rolled_back.active_version(), 1);
        assert_eq!(rolled_back.versions().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_appends_never_share_a_version_number() {
        let repository = Arc::new(repository_with_template("t1").await);
        let warmup = repository.append_version("t1", "B2".to_owned()).await;
        assert!(warmup.is_ok());

        let left = {
            let repository = repository.clone();
            tokio::spawn(async move { repository.append_version("t1", "left".to_owned()).await })
        };
        let right = {
            let repository = repository.clone();
            tokio::spawn(async move { repository.append_version("t1", "right".to_owned()).await })
        };

        let left = left.await;
        let right = right.await;
        assert!(left.is_ok());
        assert!(right.is_ok());

        let stored = repository.find("t1").await.unwrap_or_default();
        assert!(stored.is_some());
        let stored = stored.unwrap_or_else(|| unreachable!());
        let versions: BTreeSet<i32> = stored
            .versions()
            .iter()
            .map(|revision| revision.version())
            .collect();
        assert_eq!(stored.versions().len(), 4);
        assert_eq!(versions, BTreeSet::from([1, 2, 3, 4]));
        assert_eq!(stored.active_version(), 4);
    }

    #[tokio::test]
    async fn rollback_distinguishes_missing_template_from_missing_version() {
        let repository = repository_with_template("t1").await;

        let missing_template = repository.rollback("t9", 1).await;
        assert!(matches!(missing_template, Err(AppError::NotFound(_))));

        let missing_version = repository.rollback("t1", 9).await;
        assert!(matches!(missing_version, Err(AppError::VersionNotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_the_whole_history() {
        let repository = repository_with_template("t1").await;
        let appended = repository.append_version("t1", "B2".to_owned()).await;
        assert!(appended.is_ok());

        let removed = repository.delete("t1").await;
        assert!(removed.is_ok());
        assert!(removed.unwrap_or(false));
        assert!(repository.find("t1").await.unwrap_or_default().is_none());

        let removed_again = repository.delete("t1").await;
        assert!(removed_again.is_ok());
        assert!(!removed_again.unwrap_or(true));
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_conflict() {
        let repository = repository_with_template("t1").await;
        let duplicate = Template::new("t1", "Other", TemplateKind::Kys, "B", 1_000)
            .unwrap_or_else(|_| unreachable!());
        let result = repository.insert(duplicate).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
