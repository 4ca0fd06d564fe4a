use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use skillgraph_core::AppResult;
use skillgraph_domain::AuditAction;

/// Immutable log entry describing one accepted privileged action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    /// Unique identifier generated at write time.
    pub id: String,
    /// Actor that performed the action; never empty.
    pub actor: String,
    /// Stable verb-noun action identifier.
    pub action: String,
    /// Resource type label.
    pub entity: String,
    /// Resource identifier.
    pub entity_id: String,
    /// Epoch-millisecond timestamp, non-decreasing in insertion order.
    pub timestamp_ms: i64,
    /// Optional free-form attachment, e.g. changed fields.
    pub metadata: Option<Value>,
}

/// Audit payload submitted by application services.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    /// Actor label; an empty value falls back to the system identity.
    pub actor: String,
    /// Action performed.
    pub action: AuditAction,
    /// Resource type label.
    pub entity: String,
    /// Resource identifier.
    pub entity_id: String,
    /// Optional free-form attachment.
    pub metadata: Option<Value>,
}

/// One newest-first page of audit records plus the total trail length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditPage {
    /// Records for the requested page, newest first.
    pub records: Vec<AuditRecord>,
    /// Total number of records in the trail.
    pub total: usize,
}

/// Port for mirroring audit events to an external analytics sink.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    /// Captures one event for the given distinct id.
    async fn capture(&self, distinct_id: &str, event: &str, properties: Value) -> AppResult<()>;
}

/// Port for the durable secondary audit store.
#[async_trait]
pub trait AuditArchive: Send + Sync {
    /// Persists one audit record.
    async fn persist(&self, record: &AuditRecord) -> AppResult<()>;
}

const MAX_PAGE_SIZE: usize = 200;
const MIRROR_TIMEOUT: Duration = Duration::from_millis(800);

/// Append-only audit trail with best-effort mirroring.
///
/// The in-process append is the durability point for the caller: it always
/// succeeds and happens before mirroring. The analytics sink and the
/// archive are mirrors only; a failed or slow mirror is logged and
/// discarded, never surfaced, and never retried synchronously.
#[derive(Clone)]
pub struct AuditTrailService {
    records: Arc<RwLock<Vec<AuditRecord>>>,
    archive: Option<Arc<dyn AuditArchive>>,
    sink: Option<Arc<dyn AnalyticsSink>>,
}

impl AuditTrailService {
    /// Creates a trail with optional mirrors.
    #[must_use]
    pub fn new(
        archive: Option<Arc<dyn AuditArchive>>,
        sink: Option<Arc<dyn AnalyticsSink>>,
    ) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            archive,
            sink,
        }
    }

    /// Appends exactly one record for an accepted privileged action and
    /// returns it.
    ///
    /// The id is generated at write time and the timestamp never decreases
    /// across records, so the trail reflects acceptance order.
    pub async fn record(&self, entry: AuditEntry) -> AuditRecord {
        let record = {
            let mut records = self.records.write().await;
            let now = Utc::now().timestamp_millis();
            let timestamp_ms = records
                .last()
                .map(|last| last.timestamp_ms.max(now))
                .unwrap_or(now);
            let actor = if entry.actor.trim().is_empty() {
                "system".to_owned()
            } else {
                entry.actor
            };

            let record = AuditRecord {
                id: format!("al_{}", Uuid::new_v4().simple()),
                actor,
                action: entry.action.as_str().to_owned(),
                entity: entry.entity,
                entity_id: entry.entity_id,
                timestamp_ms,
                metadata: entry.metadata,
            };
            records.push(record.clone());
            record
        };

        self.mirror(&record).await;
        record
    }

    /// Returns one page of records, newest first.
    ///
    /// Pages are 1-based; `page_size` is clamped to 1..=200 and a page past
    /// the end of the trail returns an empty slice, not an error.
    pub async fn list(&self, page: usize, page_size: usize) -> AuditPage {
        let records = self.records.read().await;
        let total = records.len();
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let skip = page.max(1).saturating_sub(1).saturating_mul(page_size);

        AuditPage {
            records: records
                .iter()
                .rev()
                .skip(skip)
                .take(page_size)
                .cloned()
                .collect(),
            total,
        }
    }

    async fn mirror(&self, record: &AuditRecord) {
        if let Some(sink) = &self.sink {
            let properties = serde_json::json!({
                "entity": record.entity,
                "entityId": record.entity_id,
                "metadata": record.metadata,
            });
            let capture = sink.capture(record.actor.as_str(), record.action.as_str(), properties);
            match tokio::time::timeout(MIRROR_TIMEOUT, capture).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(%error, action = record.action.as_str(), "analytics sink rejected audit event");
                }
                Err(_) => {
                    warn!(action = record.action.as_str(), "analytics sink mirror timed out");
                }
            }
        }

        if let Some(archive) = &self.archive {
            match tokio::time::timeout(MIRROR_TIMEOUT, archive.persist(record)).await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(%error, action = record.action.as_str(), "audit archive rejected record");
                }
                Err(_) => {
                    warn!(action = record.action.as_str(), "audit archive mirror timed out");
                }
            }
        }
    }
}
