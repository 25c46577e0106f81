mod engine;
mod housing_capacity;
mod lifecycle_transition;
mod lineage_integrity;
mod protocol_coverage;
mod protocol_subject_cap;

pub use engine::{Rule, RulesEngine};
pub use housing_capacity::HousingCapacity;
pub use lifecycle_transition::LifecycleTransition;
pub use lineage_integrity::LineageIntegrity;
pub use protocol_coverage::ProtocolCoverage;
pub use protocol_subject_cap::ProtocolSubjectCap;

/// The five default rules of §4.3, registered in the order the spec lists them — which is
/// also the order their violations appear in a `RuleResult` when more than one fires.
pub fn default_rules_engine() -> RulesEngine {
    let mut engine = RulesEngine::new();
    engine.register(Box::new(HousingCapacity));
    engine.register(Box::new(ProtocolSubjectCap));
    engine.register(Box::new(LifecycleTransition));
    engine.register(Box::new(LineageIntegrity));
    engine.register(Box::new(ProtocolCoverage));
    engine
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_engine_registers_all_five_rules_in_spec_order() {
        let engine = default_rules_engine();
        assert_eq!(
            engine.rule_names(),
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
