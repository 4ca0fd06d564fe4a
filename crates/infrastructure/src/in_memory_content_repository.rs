use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use skillgraph_application::{ArticleRepository, ArticleUpdate};
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::Article;

/// In-memory CMS article store; newest entries list first.
#[derive(Debug, Default)]
pub struct InMemoryContentRepository {
    articles: RwLock<Vec<Article>>,
}

impl InMemoryContentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryContentRepository {
    async fn list_articles(&self) -> AppResult<Vec<Article>> {
        Ok(self.articles.read().await.clone())
    }

    async fn insert_article(&self, article: Article) -> AppResult<()> {
        let mut articles = self.articles.write().await;

        if articles.iter().any(|stored| stored.id() == article.id()) {
            return Err(AppError::Conflict(format!(
                "article '{}' already exists",
                article.id()
            )));
        }

        articles.insert(0, article);
        Ok(())
    }

    async fn update_article(&self, id: &str, update: ArticleUpdate) -> AppResult<Article> {
        let mut articles = self.articles.write().await;
        let article = articles
            .iter_mut()
            .find(|article| article.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("article '{id}' does not exist")))?;

        article.apply_update(
            update.title,
            update.slug,
            update.content,
            Utc::now().timestamp_millis(),
        )?;
        Ok(article.clone())
    }

    async fn delete_article(&self, id: &str) -> AppResult<bool> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|article| article.id() != id);
        Ok(articles.len() < before)
    }
}
