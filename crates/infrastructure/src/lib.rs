//! Infrastructure adapters: in-memory repositories, the analytics sink,
//! and the durable audit archive.

#![forbid(unsafe_code)]

mod in_memory_content_repository;
mod in_memory_directory_repository;
mod in_memory_flag_repository;
mod in_memory_job_board_repository;
mod in_memory_support_repository;
mod in_memory_template_repository;
mod in_memory_track_repository;
mod posthog_analytics_sink;
mod postgres_audit_archive;

pub use in_memory_content_repository::InMemoryContentRepository;
pub use in_memory_directory_repository::InMemoryDirectoryRepository;
pub use in_memory_flag_repository::InMemoryFlagRepository;
pub use in_memory_job_board_repository::InMemoryJobBoardRepository;
pub use in_memory_support_repository::InMemorySupportRepository;
pub use in_memory_template_repository::InMemoryTemplateRepository;
pub use in_memory_track_repository::InMemoryTrackRepository;
pub use posthog_analytics_sink::PosthogAnalyticsSink;
pub use postgres_audit_archive::PostgresAuditArchive;
