use colonycore_base::{CoreResult, RuleResult, Severity, Violation};
use colonycore_model::{Organism, Protocol};
use colonycore_store::{Change, RuleView};

use crate::engine::Rule;

/// For each Protocol declaring a positive MaxSubjects, the number of organisms assigned to it
/// must not exceed that cap. Protocols with MaxSubjects <= 0 are uncapped and skipped.
pub struct ProtocolSubjectCap;

impl Rule for ProtocolSubjectCap {
    fn name(&self) -> &str {
        "protocol_subject_cap"
    }

    fn evaluate(&self, view: &RuleView, _changes: &[Change], result: &mut RuleResult) -> CoreResult<()> {
        let organisms = view.list::<Organism>();
        for protocol in view.list::<Protocol>() {
            if protocol.max_subjects == 0 {
                continue;
            }
            let assigned = organisms
                .iter()
                .filter(|o| o.protocol_id.as_ref() == Some(&protocol.base.id))
                .count() as u32;
            if assigned > protocol.max_subjects {
                result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!(
                        "protocol {} has {assigned} assigned organisms, over max_subjects {}",
                        protocol.base.id, protocol.max_subjects
                    ),
                    "Protocol",
                    protocol.base.id.to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use colonycore_base::EntityId;
    use colonycore_model::{ApprovalStatus, Base, Stage};
    use colonycore_store::Snapshot;
    use std::sync::Arc;

    fn protocol(id: &EntityId, max: u32) -> Protocol {
        Protocol {
            base: Base::new(id.clone(), Utc::now()),
            code: "P1".into(),
            title: "Study".into(),
            description: None,
            max_subjects: max,
            status: ApprovalStatus::Approved,
        }
    }

    fn organism(protocol_id: &EntityId) -> Organism {
        Organism {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Mouse".into(),
            species: "Mus musculus".into(),
            line: "C57BL/6".into(),
            line_id: None,
            strain_id: None,
            parent_ids: vec![],
            stage: Stage::Adult,
            cohort_id: None,
            housing_id: None,
            protocol_id: Some(protocol_id.clone()),
            project_id: None,
            attributes: Default::default(),
        }
    }

    #[test]
    fn zero_max_subjects_is_uncapped() {
        let protocol_id = EntityId::generate();
        let mut snapshot = Snapshot::default();
        snapshot.protocols.insert(protocol_id.clone(), protocol(&protocol_id, 0));
        for _ in 0..5 {
            let o = organism(&protocol_id);
            snapshot.organisms.insert(o.base.id.clone(), o);
        }
        let view = RuleView::new(Arc::new(snapshot));
        let mut result = RuleResult::new();
        ProtocolSubjectCap.evaluate(&view, &[], &mut result).expect("evaluate");
        assert!(!result.has_blocking());
    }

    #[test]
    fn exceeding_cap_blocks() {
        let protocol_id = EntityId::generate();
        let mut snapshot = Snapshot::default();
        snapshot.protocols.insert(protocol_id.clone(), protocol(&protocol_id, 1));
        for _ in 0..2 {
            let o = organism(&protocol_id);
            snapshot.organisms.insert(o.base.id.clone(), o);
        }
        let view = RuleView::new(Arc::new(snapshot));
        let mut result = RuleResult::new();
        ProtocolSubjectCap.evaluate(&view, &[], &mut result).expect("evaluate");
        assert!(result.has_blocking());
    }
}
