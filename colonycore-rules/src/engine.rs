use colonycore_base::{CoreResult, RuleResult};
use colonycore_store::{Change, RuleEvaluator, RuleView};

/// A pure function of the view and change list: it must not mutate either (enforced by
/// taking shared references) and must be safe to call from multiple transactions
/// concurrently (enforced by requiring `Send + Sync`).
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    /// Pushes zero or more violations into `result`. An `Err` aborts the whole pass; the
    /// caller sees neither this rule's partial output nor any rule registered after it.
    fn evaluate(&self, view: &RuleView, changes: &[Change], result: &mut RuleResult) -> CoreResult<()>;
}

/// Holds every registered rule and runs them in registration order, merging their
/// violations into one `RuleResult` (§4.3). Implements the `RuleEvaluator` SPI that
/// `colonycore-store` calls at commit time, so the Store never depends on this crate.
#[derive(Default)]
pub struct RulesEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        RulesEngine::default()
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl RuleEvaluator for RulesEngine {
    fn evaluate(&self, view: &RuleView, changes: &[Change]) -> CoreResult<RuleResult> {
        let mut result = RuleResult::new();
        for rule in &self.rules {
            rule.evaluate(view, changes, &mut result)?;
        }
        Ok(result)
    }
}
