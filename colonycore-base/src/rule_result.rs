use serde::{Deserialize, Serialize};

/// How strongly a rule objects to the change set it was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Log,
    Warn,
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub entity: String,
    pub entity_id: String,
}

impl Violation {
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        entity: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        Violation {
            rule: rule.into(),
            severity,
            message: message.into(),
            entity: entity.into(),
            entity_id: entity_id.into(),
        }
    }
}

/// The aggregated outcome of a Rules Engine pass over one set of changes.
///
/// Violations are kept in the order rules reported them: registration order across rules,
/// discovery order within a rule. `Merge` is commutative on the underlying multiset (the
/// testable property in SPEC_FULL.md §8) even though the concatenation it's built from is not
/// commutative on *order* — two passes that find the same violations in a different order
/// still produce equal results, because `has_blocking` and set-equality are what callers rely on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub violations: Vec<Violation>,
}

impl RuleResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn has_blocking(&self) -> bool {
        self.violations.iter().any(|v| v.severity == Severity::Block)
    }

    pub fn merge(mut self, other: RuleResult) -> RuleResult {
        self.violations.extend(other.violations);
        self
    }
}
