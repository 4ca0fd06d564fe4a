use serde::{Deserialize, Serialize};
use skillgraph_core::{AppError, AppResult};

/// A platform user as seen from the admin console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedUser {
    id: String,
    name: String,
    email: String,
    active: bool,
    verified: bool,
    onboarding_complete: bool,
    roles: Vec<String>,
}

impl ManagedUser {
    /// Creates an active, unverified user record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> AppResult<Self> {
        let id = id.into();
        let name = name.into();
        let email = email.into();
        if id.trim().is_empty() || name.trim().is_empty() {
            return Err(AppError::Validation(
                "user id and name must not be empty".to_owned(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::Validation(format!(
                "user email '{email}' is malformed"
            )));
        }

        Ok(Self {
            id,
            name,
            email,
            active: true,
            verified: false,
            onboarding_complete: true,
            roles: Vec::new(),
        })
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns whether the account is active.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Returns whether the account was manually verified.
    #[must_use]
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// Returns whether onboarding has been completed.
    #[must_use]
    pub fn onboarding_complete(&self) -> bool {
        self.onboarding_complete
    }

    /// Returns the platform roles attached to the account.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        self.roles.as_slice()
    }

    /// Sets the activation state.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Replaces the platform role list.
    pub fn set_roles(&mut self, roles: Vec<String>) {
        self.roles = roles;
    }

    /// Marks the account as verified.
    pub fn mark_verified(&mut self) {
        self.verified = true;
    }

    /// Resets onboarding so the user walks through it again.
    pub fn reset_onboarding(&mut self) {
        self.onboarding_complete = false;
    }
}

#[cfg(test)]
mod tests {
    use super::ManagedUser;

    #[test]
    fn new_user_is_active_and_unverified() {
        let user = ManagedUser::new("u1", "Ava Patel", "ava@example.com");
        assert!(user.is_ok());
        let user = user.unwrap_or_else(|_| unreachable!());
        assert!(user.active());
        assert!(!user.verified());
    }

    #[test]
    fn malformed_email_is_rejected() {
        assert!(ManagedUser::new("u1", "Ava Patel", "ava.example.com").is_err());
    }
}
