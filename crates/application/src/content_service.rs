use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use skillgraph_core::AppResult;
use skillgraph_domain::{AuditAction, Article, CallerIdentity, Permission, PermissionVerb, Resource};

use crate::{AuditEntry, AuditTrailService, AuthorizationService};

/// Field changes applied to an existing article; `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement slug.
    pub slug: Option<String>,
    /// Replacement body.
    pub content: Option<String>,
}

/// Repository port for CMS articles.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Lists articles, most recently updated first.
    async fn list_articles(&self) -> AppResult<Vec<Article>>;

    /// Stores a new article.
    async fn insert_article(&self, article: Article) -> AppResult<()>;

    /// Applies field changes to an article.
    async fn update_article(&self, id: &str, update: ArticleUpdate) -> AppResult<Article>;

    /// Removes an article. Returns `false` when it does not exist.
    async fn delete_article(&self, id: &str) -> AppResult<bool>;
}

/// Application service for CMS article administration.
#[derive(Clone)]
pub struct ContentService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn ArticleRepository>,
    audit_trail: AuditTrailService,
}

const ENTITY: &str = "article";

impl ContentService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn ArticleRepository>,
        audit_trail: AuditTrailService,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_trail,
        }
    }

    /// Lists articles.
    pub async fn list_articles(&self, caller: &CallerIdentity) -> AppResult<Vec<Article>> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Cms, PermissionVerb::Read),
        )?;

        self.repository.list_articles().await
    }

    /// Creates an article.
    pub async fn create_article(
        &self,
        caller: &CallerIdentity,
        title: String,
        slug: String,
        content: String,
    ) -> AppResult<Article> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Cms, PermissionVerb::Write),
        )?;

        let article = Article::new(
            format!("a_{}", Uuid::new_v4().simple()),
            title,
            slug,
            content,
            Utc::now().timestamp_millis(),
        )?;
        self.repository.insert_article(article.clone()).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::ArticleCreated,
                entity: ENTITY.to_owned(),
                entity_id: article.id().to_owned(),
                metadata: Some(serde_json::json!({ "slug": article.slug() })),
            })
            .await;

        Ok(article)
    }

    /// Updates an article.
    pub async fn update_article(
        &self,
        caller: &CallerIdentity,
        id: &str,
        update: ArticleUpdate,
    ) -> AppResult<Article> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Cms, PermissionVerb::Write),
        )?;

        let article = self.repository.update_article(id, update).await?;

        self.audit_trail
            .record(AuditEntry {
                actor: caller.subject().to_owned(),
                action: AuditAction::ArticleUpdated,
                entity: ENTITY.to_owned(),
                entity_id: article.id().to_owned(),
                metadata: None,
            })
            .await;

        Ok(article)
    }

    /// Deletes an article. Returns `false` when it does not exist; nothing
    /// is audited in that case.
    pub async fn delete_article(&self, caller: &CallerIdentity, id: &str) -> AppResult<bool> {
        self.authorization_service.require(
            caller,
            &Permission::new(Resource::Cms, PermissionVerb::Delete),
        )?;

        let removed = self.repository.delete_article(id).await?;
        if removed {
            self.audit_trail
                .record(AuditEntry {
                    actor: caller.subject().to_owned(),
                    action: AuditAction::ArticleDeleted,
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
    use skillgraph_domain::{Article, CallerIdentity, Role};

    use crate::{AuditTrailService, AuthorizationService, RoleGrants};

    use super::{ArticleRepository, ArticleUpdate, ContentService};

    #[derive(Default)]
    struct FakeArticleRepository {
        articles: Mutex<Vec<Article>>,
    }

    #[async_trait]
    impl ArticleRepository for FakeArticleRepository {
        async fn list_articles(&self) -> AppResult<Vec<Article>> {
            Ok(self.articles.lock().await.clone())
        }

        async fn insert_article(&self, article: Article) -> AppResult<()> {
            self.articles.lock().await.push(article);
            Ok(())
        }

        async fn update_article(&self, id: &str, update: ArticleUpdate) -> AppResult<Article> {
            let mut articles = self.articles.lock().await;
            let article = articles
                .iter_mut()
                .find(|article| article.id() == id)
                .ok_or_else(|| AppError::NotFound(format!("article '{id}' does not exist")))?;
            article.apply_update(update.title, update.slug, update.content, 0)?;
            Ok(article.clone())
        }

        async fn delete_article(&self, id: &str) -> AppResult<bool> {
            let mut articles = self.articles.lock().await;
            let before = articles.len();
            articles.retain(|article| article.id() != id);
            Ok(articles.len() < before)
        }
    }

    fn service() -> (ContentService, AuditTrailService) {
        let audit_trail = AuditTrailService::new(None, None);
        let service = ContentService::new(
            AuthorizationService::new(RoleGrants::builtin()),
            Arc::new(FakeArticleRepository::default()),
            audit_trail.clone(),
        );
        (service, audit_trail)
    }

    #[tokio::test]
    async fn support_is_denied_cms_writes_with_no_side_effects() {
        let (service, audit_trail) = service();
        let support = CallerIdentity::new("support", Some(Role::Support));

        let result = service
            .create_article(
                &support,
                "Getting Started".to_owned(),
                "getting-started".to_owned(),
                "Welcome to SkillGraph".to_owned(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(audit_trail.list(1, 50).await.total, 0);

        let admin = CallerIdentity::new("admin", Some(Role::Admin));
        assert!(
            service
                .list_articles(&admin)
                .await
                .unwrap_or_default()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn create_update_delete_audit_once_each() {
        let (service, audit_trail) = service();
        let admin = CallerIdentity::new("admin", Some(Role::Admin));

        let article = service
            .create_article(
                &admin,
                "Getting Started".to_owned(),
                "getting-started".to_owned(),
                "Welcome to SkillGraph".to_owned(),
            )
            .await;
        assert!(article.is_ok());
        let article = article.unwrap_or_else(|_| unreachable!());

        let updated = service
            .update_article(
                &admin,
                article.id(),
                ArticleUpdate {
                    title: Some("Getting started".to_owned()),
                    ..ArticleUpdate::default()
                },
            )
            .await;
        assert!(updated.is_ok());

        let removed = service.delete_article(&admin, article.id()).await;
        assert!(removed.is_ok());
        assert!(removed.unwrap_or(false));

        let page = audit_trail.list(1, 50).await;
        assert_eq!(page.total, 3);
        assert_eq!(page.records[0].action, "cms.delete");
        assert_eq!(page.records[2].action, "cms.create");
    }
}
