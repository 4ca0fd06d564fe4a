use std::env;

use skillgraph_core::AppError;

/// Runtime configuration collected from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub database_url: Option<String>,
    pub posthog_key: Option<String>,
    pub posthog_host: String,
    pub seed_demo_data: bool,
}

impl ApiConfig {
    /// Loads configuration, applying defaults for anything unset.
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let database_url = optional_env("DATABASE_URL");
        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        let posthog_key = optional_env("POSTHOG_KEY");
        let posthog_host =
            env::var("POSTHOG_HOST").unwrap_or_else(|_| "https://app.posthog.com".to_owned());

        let seed_demo_data = env::var("SEED_DEMO_DATA")
            .unwrap_or_else(|_| "true".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            database_url,
            posthog_key,
            posthog_host,
            seed_demo_data,
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
