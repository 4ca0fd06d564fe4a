use skillgraph_application::{
    AuditTrailService, AuthorizationService, ContentService, FlagService, JobModerationService,
    SupportService, TemplateService, TrackService, UserAdminService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub audit_trail: AuditTrailService,
    pub user_admin_service: UserAdminService,
    pub job_moderation_service: JobModerationService,
    pub template_service: TemplateService,
    pub content_service: ContentService,
    pub support_service: SupportService,
    pub track_service: TrackService,
    pub flag_service: FlagService,
}
