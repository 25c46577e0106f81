use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An in-flight span. Every `Tracer::start` must be matched by exactly one `end` call;
/// dropping a `Box<dyn Span>` without calling `end` is a caller bug this crate doesn't try
/// to detect (no `Drop`-based panic-on-forget — the teacher's tracing spans are likewise
/// plain RAII guards, not enforced-completion primitives).
pub trait Span: Send {
    fn end(self: Box<Self>, error: Option<&str>);
}

pub trait Tracer: Send + Sync {
    fn start(&self, operation: &str) -> Box<dyn Span>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

struct NoopSpan;
impl Span for NoopSpan {
    fn end(self: Box<Self>, _error: Option<&str>) {}
}

impl Tracer for NoopTracer {
    fn start(&self, _operation: &str) -> Box<dyn Span> {
        Box::new(NoopSpan)
    }
}

/// One completed span as the JSON tracer records it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub operation: String,
    pub status: &'static str,
    pub duration_ms: u128,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Encodes each span to a `Write` sink as it ends and retains a copy in memory for tests and
/// introspection that don't want to parse the sink back out.
pub struct JsonTracer {
    sink: Mutex<Box<dyn Write + Send>>,
    history: Mutex<Vec<SpanRecord>>,
}

impl JsonTracer {
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        JsonTracer { sink: Mutex::new(sink), history: Mutex::new(Vec::new()) }
    }

    pub fn history(&self) -> Vec<SpanRecord> {
        self.history.lock().expect("tracer mutex is never poisoned by a panicking span").clone()
    }
}

struct JsonSpan {
    operation: String,
    started_at: DateTime<Utc>,
    tracer: Arc<JsonTracer>,
}

impl Span for JsonSpan {
    fn end(self: Box<Self>, error: Option<&str>) {
        let ended_at = Utc::now();
        let duration_ms = (ended_at - self.started_at).num_milliseconds().max(0) as u128;
        let record = SpanRecord {
            operation: self.operation,
            status: if error.is_some() { "error" } else { "success" },
            duration_ms,
            error: error.map(str::to_string),
            started_at: self.started_at,
            ended_at,
        };

        if let Ok(line) = serde_json::to_string(&record) {
            let mut sink = self.tracer.sink.lock().expect("tracer mutex is never poisoned by a panicking span");
            let _ = writeln!(sink, "{line}");
        }
        self.tracer.history.lock().expect("tracer mutex is never poisoned by a panicking span").push(record);
    }
}

/// `JsonTracer` is always used behind an `Arc` so spans can hand a clone back to the tracer
/// they came from without borrowing it.
pub struct SharedJsonTracer(pub Arc<JsonTracer>);

impl Tracer for SharedJsonTracer {
    fn start(&self, operation: &str) -> Box<dyn Span> {
        Box::new(JsonSpan { operation: operation.to_string(), started_at: Utc::now(), tracer: self.0.clone() })
    }
}

/// Opens a real `tracing::Span` per operation, for hosts already running a
/// `tracing_subscriber` pipeline. This is the default the umbrella `colonycore` crate wires.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTracer;

struct TracingSpan {
    span: tracing::Span,
}

impl Span for TracingSpan {
    fn end(self: Box<Self>, error: Option<&str>) {
        let _guard = self.span.enter();
        match error {
            Some(message) => tracing::warn!(target: "colonycore", error = message, "operation failed"),
            None => tracing::debug!(target: "colonycore", "operation completed"),
        }
    }
}

impl Tracer for TracingTracer {
    fn start(&self, operation: &str) -> Box<dyn Span> {
        let span = tracing::info_span!(target: "colonycore", "operation", name = %operation);
        Box::new(TracingSpan { span })
    }
}
