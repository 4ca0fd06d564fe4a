use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// A CMS help-center article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    id: String,
    title: String,
    slug: String,
    content: String,
    updated_at_ms: i64,
}

impl Article {
    /// Creates an article.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        updated_at_ms: i64,
    ) -> AppResult<Self> {
        let id = id.into();
        let title = title.into();
        let slug = slug.into();
        if id.trim().is_empty() || title.trim().is_empty() || slug.trim().is_empty() {
            return Err(AppError::Validation(
                "article id, title, and slug must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            id,
            title,
            slug,
            content: content.into(),
            updated_at_ms,
        })
    }

    /// Returns the stable article identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the article title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the URL slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.slug.as_str()
    }

    /// Returns the article body.
    #[must_use]
    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// Returns the last-modified timestamp in epoch milliseconds.
    #[must_use]
    pub fn updated_at_ms(&self) -> i64 {
        self.updated_at_ms
    }

    /// Applies field changes; `None` fields are left untouched.
    pub fn apply_update(
        &mut self,
        title: Option<String>,
        slug: Option<String>,
        content: Option<String>,
        updated_at_ms: i64,
    ) -> AppResult<()> {
        if let Some(title) = title {
            if title.trim().is_empty() {
                return Err(AppError::Validation(
                    "article title must not be empty".to_owned(),
                ));
            }
            self.title = title;
        }
        if let Some(slug) = slug {
            if slug.trim().is_empty() {
                return Err(AppError::Validation(
                    "article slug must not be empty".to_owned(),
                ));
            }
            self.slug = slug;
        }
        if let Some(content) = content {
            self.content = content;
        }
        self.updated_at_ms = updated_at_ms;

        Ok(())
    }
}
