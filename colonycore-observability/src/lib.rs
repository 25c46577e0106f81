mod audit;
mod metrics;
mod tracer;

pub use audit::{AuditAction, AuditEntry, AuditRecorder, AuditStatus, NoopAudit};
pub use metrics::{MetricsRecorder, MetricsSnapshot, NoopMetrics, OperationMetrics, PrometheusMetrics};
pub use tracer::{JsonTracer, NoopTracer, SharedJsonTracer, Span, SpanRecord, Tracer, TracingTracer};
