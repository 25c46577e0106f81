use colonycore_base::{CoreResult, RuleResult};
use colonycore_rules::{Rule, RulesEngine};
use colonycore_store::{Change, RuleEvaluator, RuleView};
use parking_lot::RwLock;

/// Wraps a `RulesEngine` behind a lock so `Service::install_plugin` can append rules after
/// construction while `Store` still only ever sees the `RuleEvaluator` SPI it was opened
/// with. The `Store` holds an `Arc<dyn RuleEvaluator>` fixed at `Store::open`; this is the
/// one piece of mutable state behind that `Arc`.
#[derive(Default)]
pub struct DynamicEngine {
    inner: RwLock<RulesEngine>,
}

impl DynamicEngine {
    pub fn new(engine: RulesEngine) -> Self {
        DynamicEngine { inner: RwLock::new(engine) }
    }

    pub fn register(&self, rule: Box<dyn Rule>) {
        self.inner.write().register(rule);
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.inner.read().rule_names().into_iter().map(str::to_string).collect()
    }
}

impl RuleEvaluator for DynamicEngine {
    fn evaluate(&self, view: &RuleView, changes: &[Change]) -> CoreResult<RuleResult> {
        self.inner.read().evaluate(view, changes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use colonycore_rules::HousingCapacity;
    use std::sync::Arc;

    #[test]
    fn rules_registered_after_construction_take_effect() {
        let engine = DynamicEngine::new(RulesEngine::new());
        assert!(engine.rule_names().is_empty());
        engine.register(Box::new(HousingCapacity));
        assert_eq!(engine.rule_names(), vec!["housing_capacity"]);

        let view = RuleView::new(Arc::new(colonycore_store::Snapshot::default()));
        let result = engine.evaluate(&view, &[]).expect("evaluate");
        assert!(!result.has_blocking());
    }
}
