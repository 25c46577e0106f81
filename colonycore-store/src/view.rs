use std::sync::Arc;

use colonycore_base::{CoreResult, EntityId, RuleResult};

use crate::change::Change;
use crate::snapshot::{EntityMap, Snapshot};

/// A read-only projection of a snapshot, handed to rules and to read-only `Store::view`
/// callers. Cheap to construct (an `Arc` clone); every typed accessor still returns an owned,
/// deep-cloned value, so nothing a caller mutates can alias store state.
#[derive(Debug, Clone)]
pub struct RuleView {
    snapshot: Arc<Snapshot>,
}

impl RuleView {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        RuleView { snapshot }
    }

    pub fn get<E: EntityMap>(&self, id: &EntityId) -> Option<E> {
        E::map(&self.snapshot).get(id).cloned()
    }

    pub fn list<E: EntityMap>(&self) -> Vec<E> {
        E::map(&self.snapshot).values().cloned().collect()
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// The SPI the Rules Engine implements, and the only thing the Store knows about rules.
/// Keeping this trait (rather than a concrete `RulesEngine`) in `colonycore-store` is what
/// lets `colonycore-rules` depend on `colonycore-store` (for `RuleView`/`Change`) without a
/// cycle back the other way.
pub trait RuleEvaluator: Send + Sync {
    fn evaluate(&self, view: &RuleView, changes: &[Change]) -> CoreResult<RuleResult>;
}

/// An evaluator that never objects to anything; used by tests and by any `Store` built
/// without a Rules Engine wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvaluator;

impl RuleEvaluator for NoopEvaluator {
    fn evaluate(&self, _view: &RuleView, _changes: &[Change]) -> CoreResult<RuleResult> {
        Ok(RuleResult::default())
    }
}
