//! SkillGraph admin API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware::from_fn;
use axum::routing::{delete, get, patch, post, put};
use skillgraph_application::{
    AnalyticsSink, AuditArchive, AuditTrailService, AuthorizationService, ContentService,
    FlagService, JobModerationService, RoleGrants, SupportService, TemplateService, TrackService,
    UserAdminService,
};
use skillgraph_core::AppError;
use skillgraph_infrastructure::{
    InMemoryContentRepository, InMemoryDirectoryRepository, InMemoryFlagRepository,
    InMemoryJobBoardRepository, InMemorySupportRepository, InMemoryTemplateRepository,
    InMemoryTrackRepository, PosthogAnalyticsSink, PostgresAuditArchive,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api_config::ApiConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let archive: Option<Arc<dyn AuditArchive>> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to run migrations: {error}"))
                })?;

            if config.migrate_only {
                info!("database migrations applied successfully");
                return Ok(());
            }

            Some(Arc::new(PostgresAuditArchive::new(pool)))
        }
        None => None,
    };

    let sink: Option<Arc<dyn AnalyticsSink>> = config.posthog_key.as_ref().map(|key| {
        Arc::new(PosthogAnalyticsSink::new(
            reqwest::Client::new(),
            key.clone(),
            config.posthog_host.as_str(),
        )) as Arc<dyn AnalyticsSink>
    });

    let audit_trail = AuditTrailService::new(archive, sink);
    let authorization_service = AuthorizationService::new(RoleGrants::builtin());

    let directory_repository = Arc::new(InMemoryDirectoryRepository::new());
    let job_board_repository = Arc::new(InMemoryJobBoardRepository::new());
    let template_repository = Arc::new(InMemoryTemplateRepository::new());
    let content_repository = Arc::new(InMemoryContentRepository::new());
    let support_repository = Arc::new(InMemorySupportRepository::new());
    let track_repository = Arc::new(InMemoryTrackRepository::new());
    let flag_repository = Arc::new(InMemoryFlagRepository::new());

    if config.seed_demo_data {
        dev_seed::run(
            directory_repository.as_ref(),
            job_board_repository.as_ref(),
            template_repository.as_ref(),
            content_repository.as_ref(),
            support_repository.as_ref(),
            track_repository.as_ref(),
            flag_repository.as_ref(),
        )
        .await?;
        info!("demo data seeded");
    }

    let app_state = AppState {
        authorization_service: authorization_service.clone(),
        audit_trail: audit_trail.clone(),
        user_admin_service: UserAdminService::new(
            authorization_service.clone(),
            directory_repository,
            audit_trail.clone(),
        ),
        job_moderation_service: JobModerationService::new(
            authorization_service.clone(),
            job_board_repository,
            audit_trail.clone(),
        ),
        template_service: TemplateService::new(
            authorization_service.clone(),
            template_repository,
            audit_trail.clone(),
        ),
        content_service: ContentService::new(
            authorization_service.clone(),
            content_repository,
            audit_trail.clone(),
        ),
        support_service: SupportService::new(
            authorization_service.clone(),
            support_repository,
            audit_trail.clone(),
        ),
        track_service: TrackService::new(
            authorization_service.clone(),
            track_repository,
            audit_trail.clone(),
        ),
        flag_service: FlagService::new(authorization_service, flag_repository, audit_trail),
    };

    let app = build_router(app_state, &config)?;

    let host = IpAddr::from_str(&config.api_host).map_err(|error| {
        AppError::Internal(format!("invalid API_HOST '{}': {error}", config.api_host))
    })?;
    let address = SocketAddr::from((host, config.api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "skillgraph-admin-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn build_router(app_state: AppState, config: &ApiConfig) -> Result<Router, AppError> {
    let cors_layer = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static("x-admin-role"),
            HeaderName::from_static("x-admin-subject"),
        ]);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/me", get(handlers::session::me_handler))
        .route("/api/users", get(handlers::users::list_users_handler))
        .route(
            "/api/users/{id}",
            patch(handlers::users::set_user_active_handler),
        )
        .route(
            "/api/users/{id}/roles",
            put(handlers::users::set_user_roles_handler),
        )
        .route(
            "/api/users/{id}/verify",
            post(handlers::users::verify_user_handler),
        )
        .route(
            "/api/users/{id}/onboarding/reset",
            post(handlers::users::reset_user_onboarding_handler),
        )
        .route("/api/jobs", get(handlers::jobs::list_jobs_handler))
        .route(
            "/api/jobs/{id}/approve",
            post(handlers::jobs::approve_job_handler),
        )
        .route(
            "/api/jobs/{id}/reject",
            post(handlers::jobs::reject_job_handler),
        )
        .route(
            "/api/templates",
            get(handlers::templates::list_templates_handler)
                .post(handlers::templates::create_template_handler),
        )
        .route(
            "/api/templates/{id}",
            patch(handlers::templates::update_template_handler)
                .delete(handlers::templates::delete_template_handler),
        )
        .route(
            "/api/templates/{id}/versions",
            post(handlers::templates::add_template_version_handler),
        )
        .route(
            "/api/templates/{id}/rollback",
            post(handlers::templates::rollback_template_handler),
        )
        .route(
            "/api/cms",
            get(handlers::cms::list_articles_handler).post(handlers::cms::create_article_handler),
        )
        .route(
            "/api/cms/{id}",
            patch(handlers::cms::update_article_handler)
                .delete(handlers::cms::delete_article_handler),
        )
        .route(
            "/api/support",
            get(handlers::support::list_tickets_handler)
                .post(handlers::support::create_ticket_handler),
        )
        .route(
            "/api/support/{id}",
            patch(handlers::support::update_ticket_handler)
                .delete(handlers::support::delete_ticket_handler),
        )
        .route(
            "/api/tracks",
            get(handlers::tracks::list_tracks_handler).post(handlers::tracks::create_track_handler),
        )
        .route(
            "/api/tracks/{id}",
            patch(handlers::tracks::update_track_handler)
                .delete(handlers::tracks::delete_track_handler),
        )
        .route(
            "/api/tracks/{id}/steps",
            post(handlers::tracks::add_track_step_handler),
        )
        .route(
            "/api/tracks/{id}/steps/{step_id}",
            delete(handlers::tracks::remove_track_step_handler),
        )
        .route(
            "/api/tracks/{id}/assignments",
            post(handlers::tracks::assign_track_users_handler),
        )
        .route(
            "/api/flags",
            get(handlers::flags::list_flags_handler).put(handlers::flags::set_flag_handler),
        )
        .route("/api/audit", get(handlers::audit::list_audit_log_handler))
        .layer(from_fn(middleware::resolve_caller))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
