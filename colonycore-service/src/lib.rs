mod dataset;
mod engine;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use colonycore_auth::Scope;
use colonycore_base::{CancellationToken, Clock, CoreError, CoreResult, EntityId, RuleResult, SystemClock};
use colonycore_dataset::{DatasetOutcome, OutputFormat, TemplateDescriptor};
use colonycore_model::EntityKind;
use colonycore_observability::{
    AuditAction, AuditEntry, AuditRecorder, AuditStatus, MetricsRecorder, NoopAudit, NoopMetrics, NoopTracer, Tracer,
};
use colonycore_registry::{InstalledPlugin, Plugin, PluginId};
use colonycore_rules::default_rules_engine;
use colonycore_store::{DriverConfig, EntityMap, RuleView, Snapshot, Store, Transaction};
use serde_json::Value;

pub use dataset::DatasetRegistry;
pub use engine::DynamicEngine;

/// Wires `Store` + `RulesEngine` + `Clock` + the observability sinks of §4.6 into the typed,
/// audited operations callers actually use. Mirrors the teacher's "one struct that organizes
/// several collaborating resources and dispatches typed requests" shape, generalized from
/// node-to-node messaging to entity-store operations.
pub struct Service {
    store: Arc<Store>,
    engine: Arc<DynamicEngine>,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditRecorder>,
    metrics: Arc<dyn MetricsRecorder>,
    tracer: Arc<dyn Tracer>,
    datasets: DatasetRegistry,
}

/// Assembles a `Service`, defaulting every observability sink to its no-op implementation
/// and the clock to wall-clock UTC; `colonycore`'s umbrella builder overrides these with the
/// tracing-backed defaults, but nothing in this crate forces that choice on a caller who just
/// wants a store and the default rules.
pub struct ServiceBuilder {
    driver: DriverConfig,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditRecorder>,
    metrics: Arc<dyn MetricsRecorder>,
    tracer: Arc<dyn Tracer>,
    register_default_rules: bool,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        ServiceBuilder {
            driver: DriverConfig::Memory,
            clock: Arc::new(SystemClock),
            audit: Arc::new(NoopAudit),
            metrics: Arc::new(NoopMetrics),
            tracer: Arc::new(NoopTracer),
            register_default_rules: true,
        }
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        ServiceBuilder::default()
    }

    pub fn driver(mut self, driver: DriverConfig) -> Self {
        self.driver = driver;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn audit(mut self, audit: Arc<dyn AuditRecorder>) -> Self {
        self.audit = audit;
        self
    }

    pub fn metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn tracer(mut self, tracer: Arc<dyn Tracer>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Opts out of the five default rules of §4.3, for callers (mainly tests) that want a
    /// store with only plugin-contributed or hand-registered rules.
    pub fn without_default_rules(mut self) -> Self {
        self.register_default_rules = false;
        self
    }

    pub fn build(self) -> CoreResult<Service> {
        let rules_engine = if self.register_default_rules {
            default_rules_engine()
        } else {
            colonycore_rules::RulesEngine::new()
        };
        let engine = Arc::new(DynamicEngine::new(rules_engine));
        let store = Arc::new(Store::open_with_clock(self.driver, engine.clone(), self.clock.clone())?);
        Ok(Service {
            store,
            engine,
            clock: self.clock,
            audit: self.audit,
            metrics: self.metrics,
            tracer: self.tracer,
            datasets: DatasetRegistry::new(),
        })
    }
}

impl Service {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsRecorder> {
        &self.metrics
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.engine.rule_names()
    }

    /// Creates `entity` inside a transaction, then records an audit entry, a metrics
    /// observation, and a trace span for `operation` (§4.4's "per operation-level
    /// bookkeeping"). Returns the assigned id alongside the full aggregated `RuleResult`, so
    /// a caller can inspect non-blocking violations even on a successful commit.
    pub fn create<E: EntityMap>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        entity: E,
    ) -> CoreResult<(EntityId, RuleResult)> {
        self.run(operation, E::KIND, AuditAction::Create, cancel, |txn| txn.create(entity), |id: &EntityId| {
            id.to_string()
        })
    }

    pub fn update<E: EntityMap>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        id: &EntityId,
        mutator: impl FnOnce(&mut E),
    ) -> CoreResult<((), RuleResult)> {
        let id_for_audit = id.to_string();
        self.run(operation, E::KIND, AuditAction::Update, cancel, |txn| txn.update::<E>(id, mutator), move |_| {
            id_for_audit
        })
    }

    pub fn delete<E: EntityMap>(
        &self,
        operation: &str,
        cancel: &CancellationToken,
        id: &EntityId,
    ) -> CoreResult<((), RuleResult)> {
        let id_for_audit = id.to_string();
        self.run(operation, E::KIND, AuditAction::Delete, cancel, |txn| txn.delete::<E>(id), move |_| id_for_audit)
    }

    pub fn get<E: EntityMap>(&self, id: &EntityId) -> Option<E> {
        self.store.get(id)
    }

    pub fn list<E: EntityMap>(&self) -> Vec<E> {
        self.store.list()
    }

    pub fn view<T>(&self, cancel: &CancellationToken, f: impl FnOnce(&RuleView) -> T) -> T {
        self.store.view(cancel, f)
    }

    pub fn import_state(&self, snapshot: Snapshot) -> CoreResult<()> {
        self.store.import_state(snapshot)
    }

    pub fn export_state(&self) -> Snapshot {
        self.store.export_state()
    }

    /// Installs a plugin per §4.4: validates and binds every dataset template it submits
    /// against this service's `Environment` (clock + a store projection runners can
    /// downcast back out), then — only if that fully succeeds — appends its rules to the
    /// live engine, merges its schemas, and publishes its templates.
    pub fn install_plugin(&self, plugin: &dyn Plugin) -> CoreResult<PluginId> {
        let env = dataset::environment(self.clock.clone(), self.store.clone());
        let installed: InstalledPlugin = self.datasets.install(plugin, &env)?;
        for rule in installed.rules {
            self.engine.register(rule);
        }
        Ok(installed.id)
    }

    pub fn is_plugin_installed(&self, name: &str) -> bool {
        self.datasets.is_installed(name)
    }

    pub fn schema_for(&self, kind: EntityKind) -> Option<Value> {
        self.datasets.schema_for(kind)
    }

    pub fn dataset_descriptors(&self) -> Vec<TemplateDescriptor> {
        self.datasets.descriptors()
    }

    pub fn dataset_supports_format(&self, slug: &str, format: OutputFormat) -> Option<bool> {
        self.datasets.supports_format(slug, format)
    }

    /// Executes a bound dataset template per §4.5: parameter validation short-circuits the
    /// runner on any error, and a successful run's result is canonicalized (columns default
    /// to the template's declaration, `GeneratedAt` defaults to this service's clock).
    pub fn run_dataset(
        &self,
        slug: &str,
        raw_parameters: &BTreeMap<String, Value>,
        scope: Scope,
        format: OutputFormat,
    ) -> CoreResult<DatasetOutcome> {
        self.datasets.run(slug, raw_parameters, scope, format, self.clock.as_ref())
    }

    fn run<T, F, I>(
        &self,
        operation: &str,
        entity: EntityKind,
        action: AuditAction,
        cancel: &CancellationToken,
        f: F,
        id_of: I,
    ) -> CoreResult<(T, RuleResult)>
    where
        F: FnOnce(&mut Transaction) -> CoreResult<T>,
        I: FnOnce(&T) -> String,
    {
        let span = self.tracer.start(operation);
        let started = Instant::now();
        let outcome = self.store.run_in_transaction(cancel, f);
        let duration = started.elapsed();
        let timestamp = self.clock.now();

        match outcome {
            Ok((value, rule_result)) => {
                let entity_id = id_of(&value);
                self.audit.record(AuditEntry::new(
                    operation,
                    entity.as_str(),
                    entity_id,
                    action,
                    AuditStatus::Success,
                    duration,
                    timestamp,
                ));
                self.metrics.observe(operation, true, duration);
                span.end(None);
                Ok((value, rule_result))
            }
            Err(err) => {
                let message = err.to_string();
                self.audit.record(
                    AuditEntry::new(
                        operation,
                        entity.as_str(),
                        String::new(),
                        action,
                        AuditStatus::Success,
                        duration,
                        timestamp,
                    )
                    .with_error(message.clone()),
                );
                self.metrics.observe(operation, false, duration);
                span.end(Some(&message));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use colonycore_model::{Base, Facility, HousingEnvironment, HousingState, HousingUnit, Organism, Stage};
    use std::sync::Mutex;

    fn facility() -> Facility {
        Facility {
            base: Base::new(EntityId::default(), Utc::now()),
            code: "F1".into(),
            name: "Main".into(),
            zone: "north".into(),
            access_policy: "restricted".into(),
            environment_baselines: Default::default(),
            housing_unit_ids: vec![],
            project_ids: vec![],
        }
    }

    fn housing_unit(facility_id: EntityId, capacity: u32) -> HousingUnit {
        HousingUnit {
            base: Base::new(EntityId::default(), Utc::now()),
            name: "Tank".into(),
            facility_id,
            capacity,
            environment: HousingEnvironment::Aquatic,
            state: HousingState::Active,
        }
    }

    fn organism(housing_id: &EntityId) -> Organism {
        Organism {
            base: Base::new(EntityId::default(), Utc::now()),
            name: "Fish".into(),
            species: "Danio rerio".into(),
            line: "wt".into(),
            line_id: None,
            strain_id: None,
            parent_ids: vec![],
            stage: Stage::Adult,
            cohort_id: None,
            housing_id: Some(housing_id.clone()),
            protocol_id: None,
            project_id: None,
            attributes: Default::default(),
        }
    }

    #[derive(Default)]
    struct RecordingAudit {
        entries: Mutex<Vec<AuditEntry>>,
    }

    impl AuditRecorder for RecordingAudit {
        fn record(&self, entry: AuditEntry) {
            self.entries.lock().unwrap().push(entry);
        }
    }

    #[test]
    fn create_records_audit_and_metrics() {
        let audit = Arc::new(RecordingAudit::default());
        let service =
            Service::builder().audit(audit.clone() as Arc<dyn AuditRecorder>).build().expect("build service");
        let cancel = CancellationToken::new();

        let (id, rule_result) = service.create("create_facility", &cancel, facility()).expect("create");
        assert!(!id.is_blank());
        assert!(!rule_result.has_blocking());
        assert_eq!(audit.entries.lock().unwrap().len(), 1);
        assert_eq!(service.get::<Facility>(&id).unwrap().code, "F1");
    }

    #[test]
    fn blocking_rule_violation_is_audited_as_an_error() {
        let audit = Arc::new(RecordingAudit::default());
        let service =
            Service::builder().audit(audit.clone() as Arc<dyn AuditRecorder>).build().expect("build service");
        let cancel = CancellationToken::new();

        let (facility_id, _) = service.create("create_facility", &cancel, facility()).expect("create facility");
        let (unit_id, _) =
            service.create("create_housing_unit", &cancel, housing_unit(facility_id, 1)).expect("create unit");

        service.create("create_organism", &cancel, organism(&unit_id)).expect("first organism");
        let err = service.create("create_organism", &cancel, organism(&unit_id)).expect_err("overflow is blocked");
        assert!(matches!(err, CoreError::RuleViolation(_)));

        let entries = audit.entries.lock().unwrap();
        assert_eq!(entries.last().unwrap().status, AuditStatus::Error);
    }

    #[test]
    fn plugin_install_registers_rules_and_publishes_templates() {
        use colonycore_dataset::{Dialect, DatasetTemplate, OutputColumn, ParamType, RunOutcome, Runner, TemplateMetadata};
        use colonycore_registry::Registry;
        use std::collections::BTreeSet;

        struct NoopRunner;
        impl Runner for NoopRunner {
            fn run(&self, _request: &colonycore_dataset::RunRequest) -> CoreResult<RunOutcome> {
                Ok(RunOutcome::default())
            }
        }

        struct Census;
        impl Plugin for Census {
            fn name(&self) -> &str {
                "census"
            }
            fn version(&self) -> &str {
                "1"
            }
            fn register(&self, registry: &mut Registry) -> CoreResult<()> {
                let template = DatasetTemplate {
                    plugin: "census".into(),
                    key: "roster".into(),
                    version: "1".into(),
                    title: "Roster".into(),
                    description: None,
                    dialect: Dialect::Sql,
                    query: "select 1".into(),
                    parameters: vec![],
                    columns: vec![OutputColumn::new("id", ParamType::String)],
                    metadata: TemplateMetadata::default(),
                    output_formats: BTreeSet::from([OutputFormat::Json]),
                };
                registry
                    .register_dataset_template(template, Box::new(|_env| Ok(Box::new(NoopRunner) as Box<dyn Runner>)))
            }
        }

        let service = Service::builder().without_default_rules().build().expect("build service");
        assert!(service.rule_names().is_empty());

        let id = service.install_plugin(&Census).expect("install plugin");
        assert_eq!(id.to_string(), "census@1");
        assert!(service.is_plugin_installed("census"));
        assert_eq!(service.dataset_descriptors().len(), 1);

        let outcome = service
            .run_dataset("census/roster@1", &BTreeMap::new(), Scope::new("alice"), OutputFormat::Json)
            .expect("run dataset");
        assert!(matches!(outcome, DatasetOutcome::Result(_)));
    }
}
