use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use colonycore_auth::Scope;
use colonycore_base::{Clock, CoreError, CoreResult};
use serde_json::Value;

use crate::param::{validate_and_coerce, ParamError, ParamValue};
use crate::template::{DatasetTemplate, OutputColumn, OutputFormat, TemplateDescriptor};

/// What a bound template hands its runner: the template's identity, the cleaned parameter
/// set, and the scope the caller executed under. The store itself never appears here — a
/// runner that needs it gets one through `Environment::downcast_store`, keeping this crate
/// free of a dependency on `colonycore-store`.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub template: TemplateDescriptor,
    pub parameters: BTreeMap<String, ParamValue>,
    pub scope: Scope,
}

/// What a runner produces. `columns` and `generated_at` default to the template's declared
/// columns and the execution clock respectively when left `None`, so simple runners don't
/// have to restate what the template already declares.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub columns: Option<Vec<OutputColumn>>,
    pub rows: Vec<BTreeMap<String, Value>>,
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub columns: Vec<OutputColumn>,
    pub rows: Vec<BTreeMap<String, Value>>,
    pub generated_at: DateTime<Utc>,
    pub format: OutputFormat,
}

/// The outcome of executing a bound template: either the request never reached a runner
/// because some parameter failed validation, or the runner produced a canonical result.
#[derive(Debug, Clone)]
pub enum DatasetOutcome {
    ParameterErrors(Vec<ParamError>),
    Result(RunResult),
}

/// A compiled template, ready to answer requests. Opaque to everything but the binder that
/// produced it and the runner it wraps.
pub trait Runner: Send + Sync {
    fn run(&self, request: &RunRequest) -> CoreResult<RunOutcome>;
}

/// What a binder needs to compile a template: a clock, and an opaque handle to whatever
/// store projection the embedding service wants to expose. `colonycore-service` is the
/// crate that actually constructs one, downcasting `store` back to its concrete type.
pub struct Environment {
    pub clock: Arc<dyn Clock>,
    pub store: Arc<dyn Any + Send + Sync>,
}

impl Environment {
    pub fn new(clock: Arc<dyn Clock>, store: Arc<dyn Any + Send + Sync>) -> Self {
        Environment { clock, store }
    }

    pub fn downcast_store<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.store.downcast_ref::<T>()
    }
}

/// Compiles a template's query text into a `Runner` the first time it's asked to. Binders
/// are invoked exactly once per `BoundTemplate`; a template whose binder hasn't run yet
/// answers every execution request with "template not bound".
pub type Binder = Box<dyn Fn(&Environment) -> CoreResult<Box<dyn Runner>> + Send + Sync>;

pub struct BoundTemplate {
    pub template: DatasetTemplate,
    binder: Binder,
    runner: OnceLock<Box<dyn Runner>>,
}

impl BoundTemplate {
    pub fn new(template: DatasetTemplate, binder: Binder) -> CoreResult<Self> {
        template.validate()?;
        Ok(BoundTemplate { template, binder, runner: OnceLock::new() })
    }

    pub fn is_bound(&self) -> bool {
        self.runner.get().is_some()
    }

    /// Idempotent: calling this on an already-bound template is a no-op, not a rebind.
    pub fn bind(&self, env: &Environment) -> CoreResult<()> {
        if self.is_bound() {
            return Ok(());
        }
        let runner = (self.binder)(env)?;
        // Lost races just mean someone else's binder result won; both are valid compiles of
        // the same immutable query text, so keeping whichever set first is fine.
        let _ = self.runner.set(runner);
        Ok(())
    }

    pub fn supports_format(&self, format: OutputFormat) -> bool {
        self.template.supports_format(format)
    }

    /// Implements §4.5's execution order precisely: bound check, format gate, parameter
    /// coercion (short-circuiting on any error without invoking the runner), then the
    /// runner call and result canonicalization.
    pub fn execute(
        &self,
        raw_parameters: &BTreeMap<String, Value>,
        scope: Scope,
        format: OutputFormat,
        clock: &dyn Clock,
    ) -> CoreResult<DatasetOutcome> {
        let runner = self.runner.get().ok_or_else(|| CoreError::dataset("template not bound"))?;
        if !self.supports_format(format) {
            return Err(CoreError::dataset(format!("unsupported output format: {format:?}")));
        }

        let (cleaned, errors) = validate_and_coerce(&self.template.parameters, raw_parameters);
        if !errors.is_empty() {
            return Ok(DatasetOutcome::ParameterErrors(errors));
        }

        let request = RunRequest { template: self.template.descriptor(), parameters: cleaned, scope };
        let outcome = runner.run(&request)?;
        let columns = outcome.columns.unwrap_or_else(|| self.template.columns.clone());
        let generated_at = outcome.generated_at.unwrap_or_else(|| clock.now());
        Ok(DatasetOutcome::Result(RunResult { columns, rows: outcome.rows, generated_at, format }))
    }
}
