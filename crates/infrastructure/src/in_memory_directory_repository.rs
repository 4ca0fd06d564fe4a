use async_trait::async_trait;
use tokio::sync::RwLock;

use skillgraph_application::{DirectoryRepository, UserListQuery, UserPage};
use skillgraph_core::{AppError, AppResult};
use skillgraph_domain::ManagedUser;

/// In-memory platform user directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    users: RwLock<Vec<ManagedUser>>,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    async fn update<F>(&self, id: &str, apply: F) -> AppResult<ManagedUser>
    where
        F: FnOnce(&mut ManagedUser),
    {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|user| user.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("user '{id}' does not exist")))?;
        apply(user);
        Ok(user.clone())
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn list_users(&self, query: UserListQuery) -> AppResult<UserPage> {
        let users = self.users.read().await;
        let needle = query
            .search
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        let matching: Vec<ManagedUser> = users
            .iter()
            .filter(|user| {
                needle.is_empty()
                    || user.name().to_lowercase().contains(needle.as_str())
                    || user.email().to_lowercase().contains(needle.as_str())
            })
            .cloned()
            .collect();
        let total = matching.len();

        Ok(UserPage {
            users: matching
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
            .read()
            .await
            .iter()
            .find(|user| user.id() == id)
            .cloned())
    }

    async fn insert_user(&self, user: ManagedUser) -> AppResult<()> {
        let mut users = self.users.write().await;

        if users.iter().any(|stored| stored.id() == user.id()) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                user.id()
            )));
        }

        users.push(user);
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

#[cfg(test)]
mod tests {
    use skillgraph_application::{DirectoryRepository, UserListQuery};
    use skillgraph_domain::ManagedUser;

    use super::InMemoryDirectoryRepository;

    async fn seeded() -> InMemoryDirectoryRepository {
        let repository = InMemoryDirectoryRepository::new();
        for (id, name, email) in [
            ("u1", "Ava Patel", "ava@example.com"),
            ("u2", "Noah Kim", "noah@example.com"),
            ("u3", "Mia Lopez", "mia@example.com"),
        ] {
            let user = ManagedUser::new(id, name, email).unwrap_or_else(|_| unreachable!());
            let inserted = repository.insert_user(user).await;
            assert!(inserted.is_ok());
        }
        repository
    }

    #[tokio::test]
    async fn search_matches_name_and_email_case_insensitively() {
        let repository = seeded().await;

        let page = repository
            .list_users(UserListQuery {
                search: Some("NOAH".to_owned()),
                offset: 0,
                limit: 20,
            })
            .await;
        assert!(page.is_ok());
        let page = page.unwrap_or_else(|_| unreachable!());
        assert_eq!(page.total, 1);
        assert_eq!(page.users[0].id(), "u2");
    }

    #[tokio::test]
    async fn listing_honors_offset_and_limit_against_the_filtered_total() {
        let repository = seeded().await;

        let page = repository
            .list_users(UserListQuery {
                search: None,
                offset: 2,
                limit: 20,
            })
            .await;
        assert!(page.is_ok());
        let page = page.unwrap_or_else(|_| unreachable!());
        assert_eq!(page.total, 3);
        assert_eq!(page.users.len(), 1);
    }
}
