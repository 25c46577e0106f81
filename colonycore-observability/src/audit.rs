use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Error,
}

/// One record of a service-level transactional call, per §6's audit entry shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub operation: String,
    pub entity: &'static str,
    pub entity_id: String,
    pub action: AuditAction,
    pub status: AuditStatus,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

impl AuditEntry {
    pub fn new(
        operation: impl Into<String>,
        entity: &'static str,
        entity_id: impl Into<String>,
        action: AuditAction,
        status: AuditStatus,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> Self {
        AuditEntry {
            operation: operation.into(),
            entity,
            entity_id: entity_id.into(),
            action,
            status,
            duration,
            timestamp,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.status = AuditStatus::Error;
        self
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u128(duration.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Observability sinks never cause an operation to fail; a sink's own errors (if any) are
/// swallowed or logged at `tracing::debug!` by the caller, never propagated as a `CoreError`.
pub trait AuditRecorder: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAudit;

impl AuditRecorder for NoopAudit {
    fn record(&self, _entry: AuditEntry) {}
}
