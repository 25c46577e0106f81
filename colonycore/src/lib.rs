//! Default-wired entry point for the colony-management platform core.
//!
//! Every `colonycore-*` crate is usable on its own; this crate is a thin convenience layer
//! on top, not assumed to be the only consumer of the library. It exists so an embedder who
//! wants "the default stack" doesn't have to assemble driver, rules engine, clock, and
//! observability sinks by hand.

use std::sync::Arc;

use colonycore_observability::TracingTracer;
use colonycore_service::{Service, ServiceBuilder};
use colonycore_store::DriverConfig;

pub use colonycore_auth::{Role, Scope};
pub use colonycore_base::{
    AttrMap, AttrValue, CancellationToken, Clock, CoreError, CoreResult, EntityId, FixedClock,
    Primitive, RuleResult, Severity, SystemClock, Violation,
};
pub use colonycore_dataset::{
    DatasetOutcome, DatasetTemplate, Environment, OutputFormat, ParamDef, ParamError, ParamType,
    ParamValue, TemplateDescriptor,
};
pub use colonycore_model::{
    ApprovalStatus, BreedingUnit, Cohort, Entity, EntityKind, EntityRecord, Facility,
    GenotypeMarker, HousingEnvironment, HousingState, HousingUnit, Line, LifecycleState,
    Observation, Organism, Permit, Procedure, ProcedureStatus, Project, Protocol, Sample,
    SampleStatus, Stage, Strain, SupplyItem, Treatment, TreatmentStatus,
};
pub use colonycore_observability::{
    AuditAction, AuditEntry, AuditRecorder, AuditStatus, MetricsRecorder, MetricsSnapshot,
    NoopAudit, NoopMetrics, NoopTracer, PrometheusMetrics, Tracer,
};
pub use colonycore_registry::{Plugin, PluginId, Registry};
pub use colonycore_rules::{default_rules_engine, Rule, RulesEngine};
pub use colonycore_service::{DatasetRegistry, DynamicEngine};
pub use colonycore_store::{Change, RuleEvaluator, RuleView, Snapshot};

/// Opens a `Service` against an in-memory store with the default five rules registered and
/// a real `tracing`-backed `Tracer`. Audit and metrics sinks stay no-op: wiring a concrete
/// sink (Prometheus, a structured log) is a decision for the embedder, not this crate.
pub fn development() -> CoreResult<Service> {
    Service::builder().driver(DriverConfig::Memory).tracer(Arc::new(TracingTracer)).build()
}

/// Opens a `Service` backed by a JSON snapshot file on disk, otherwise wired the same as
/// [`development`]. `path` is created on first commit if it does not already exist.
pub fn sqlite_backed(path: impl Into<std::path::PathBuf>) -> CoreResult<Service> {
    let driver = DriverConfig::sqlite(path)?;
    Service::builder().driver(driver).tracer(Arc::new(TracingTracer)).build()
}

pub use colonycore_service::ServiceBuilder as Builder;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn development_service_registers_default_rules() {
        let service = development().expect("build service");
        assert_eq!(
            service.rule_names(),
            vec![
                "housing_capacity",
                "protocol_subject_cap",
                "lifecycle_transition",
                "lineage_integrity",
                "protocol_coverage",
            ]
        );
    }
}
