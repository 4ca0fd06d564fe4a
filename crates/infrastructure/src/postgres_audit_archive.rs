use async_trait::async_trait;
use sqlx::PgPool;

use skillgraph_application::{AuditArchive, AuditRecord};
use skillgraph_core::{AppError, AppResult};

/// PostgreSQL-backed durable mirror for audit records.
///
/// Insert-only: records are never updated or deleted here. The audit trail
/// treats persistence failures as best-effort losses, so this repository
/// only reports them.
#[derive(Clone)]
pub struct PostgresAuditArchive {
    pool: PgPool,
}

impl PostgresAuditArchive {
    /// Creates an archive with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditArchive for PostgresAuditArchive {
    async fn persist(&self, record: &AuditRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_records (
                id,
                actor,
                action,
                entity,
                entity_id,
                timestamp_ms,
                metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.actor.as_str())
        .bind(record.action.as_str())
        .bind(record.entity.as_str())
        .bind(record.entity_id.as_str())
        .bind(record.timestamp_ms)
        .bind(record.metadata.clone())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to archive audit record: {error}")))?;

        Ok(())
    }
}
