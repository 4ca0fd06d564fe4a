//! Application services and ports.

#![forbid(unsafe_code)]

mod audit;
mod authorization_service;
mod content_service;
mod flag_service;
mod job_moderation_service;
mod support_service;
mod template_service;
mod track_service;
mod user_admin_service;

pub use audit::{
    AnalyticsSink, AuditArchive, AuditEntry, AuditPage, AuditRecord, AuditTrailService,
};
pub use authorization_service::{AuthorizationService, RoleGrants};
pub use content_service::{ArticleRepository, ArticleUpdate, ContentService};
pub use flag_service::{FlagRepository, FlagService};
pub use job_moderation_service::{JobBoardRepository, JobModerationService};
pub use support_service::{SupportService, TicketRepository};
pub use template_service::{CreateTemplateInput, TemplateRepository, TemplateService};
pub use track_service::{TrackRepository, TrackService};
pub use user_admin_service::{DirectoryRepository, UserAdminService, UserListQuery, UserPage};
