use colonycore_base::{CoreResult, RuleResult, Severity, Violation};
use colonycore_model::{ApprovalStatus, EntityKind, Organism, Procedure, Protocol, Treatment};
use colonycore_store::{Action, Change, RuleView};

use crate::engine::Rule;

/// Every Procedure must reference an approved Protocol, and every organism it names must
/// carry that same protocol assignment; every Treatment must reference a Procedure whose
/// Protocol is approved, with the same organism-coverage requirement (§3's "Protocol
/// coverage"). Runs over the change set — only newly created or edited Procedures/Treatments
/// need re-checking, since nothing else can change their own `protocol_id`/`procedure_id`.
pub struct ProtocolCoverage;

impl Rule for ProtocolCoverage {
    fn name(&self) -> &str {
        "protocol_coverage"
    }

    fn evaluate(&self, view: &RuleView, changes: &[Change], result: &mut RuleResult) -> CoreResult<()> {
        for change in changes {
            if change.action == Action::Delete {
                continue;
            }
            match change.kind {
                EntityKind::Procedure => {
                    if let Some(procedure) = change.after.decode::<Procedure>() {
                        self.check_procedure(view, &procedure, result);
                    }
                }
                EntityKind::Treatment => {
                    if let Some(treatment) = change.after.decode::<Treatment>() {
                        self.check_treatment(view, &treatment, result);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl ProtocolCoverage {
    fn approved_protocol(&self, view: &RuleView, protocol_id: &colonycore_base::EntityId) -> Option<Protocol> {
        view.get::<Protocol>(protocol_id).filter(|p| p.status == ApprovalStatus::Approved)
    }

    fn check_procedure(&self, view: &RuleView, procedure: &Procedure, result: &mut RuleResult) {
        if self.approved_protocol(view, &procedure.protocol_id).is_none() {
            result.push(Violation::new(
                self.name(),
                Severity::Block,
                format!(
                    "procedure {} references protocol {} which is not approved",
                    procedure.base.id, procedure.protocol_id
                ),
                "Procedure",
                procedure.base.id.to_string(),
            ));
            return;
        }
        for organism_id in &procedure.organism_ids {
            match view.get::<Organism>(organism_id) {
                Some(organism) if organism.protocol_id.as_ref() == Some(&procedure.protocol_id) => {}
                Some(_) => result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!(
                        "organism {organism_id} is not covered by protocol {} required by procedure {}",
                        procedure.protocol_id, procedure.base.id
                    ),
                    "Procedure",
                    procedure.base.id.to_string(),
                )),
                None => result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!("procedure {} references nonexistent organism {organism_id}", procedure.base.id),
                    "Procedure",
                    procedure.base.id.to_string(),
                )),
            }
        }
    }

    fn check_treatment(&self, view: &RuleView, treatment: &Treatment, result: &mut RuleResult) {
        let Some(procedure) = view.get::<Procedure>(&treatment.procedure_id) else {
            result.push(Violation::new(
                self.name(),
                Severity::Block,
                format!("treatment {} references nonexistent procedure {}", treatment.base.id, treatment.procedure_id),
                "Treatment",
                treatment.base.id.to_string(),
            ));
            return;
        };
        if self.approved_protocol(view, &procedure.protocol_id).is_none() {
            result.push(Violation::new(
                self.name(),
                Severity::Block,
                format!(
                    "treatment {} references procedure {} whose protocol is not approved",
                    treatment.base.id, procedure.base.id
                ),
                "Treatment",
                treatment.base.id.to_string(),
            ));
            return;
        }
        for organism_id in &treatment.organism_ids {
            match view.get::<Organism>(organism_id) {
                Some(organism) if organism.protocol_id.as_ref() == Some(&procedure.protocol_id) => {}
                _ => result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!(
                        "organism {organism_id} is not covered by protocol {} required by treatment {}",
                        procedure.protocol_id, treatment.base.id
                    ),
                    "Treatment",
                    treatment.base.id.to_string(),
                )),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;
    use colonycore_base::EntityId;
    use colonycore_model::{Base, ProcedureStatus, Stage};
    use colonycore_store::{ChangePayload, Snapshot};
    use std::sync::Arc;

    #[test]
    fn uncovered_organism_blocks() {
        let protocol = Protocol {
            base: Base::new(EntityId::generate(), Utc::now()),
            code: "P1".into(),
            title: "Study".into(),
            description: None,
            max_subjects: 0,
            status: ApprovalStatus::Approved,
        };
        let organism = Organism {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Mouse".into(),
            species: "Mus musculus".into(),
            line: "wt".into(),
            line_id: None,
            strain_id: None,
            parent_ids: vec![],
            stage: Stage::Adult,
            cohort_id: None,
            housing_id: None,
            protocol_id: None,
            project_id: None,
            attributes: Default::default(),
        };
        let procedure = Procedure {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Survey".into(),
            status: ProcedureStatus::Scheduled,
            scheduled_at: Utc::now(),
            protocol_id: protocol.base.id.clone(),
            project_id: None,
            cohort_id: None,
            organism_ids: vec![organism.base.id.clone()],
            treatment_ids: vec![],
            observation_ids: vec![],
        };

        let mut snapshot = Snapshot::default();
        snapshot.protocols.insert(protocol.base.id.clone(), protocol);
        snapshot.organisms.insert(organism.base.id.clone(), organism);
        let view = RuleView::new(Arc::new(snapshot));

        let change = Change::new(
            EntityKind::Procedure,
            Action::Create,
            ChangePayload::Absent,
            ChangePayload::of(procedure.into()),
        );

        let mut result = RuleResult::new();
        ProtocolCoverage.evaluate(&view, &[change], &mut result).expect("evaluate");
        assert!(result.has_blocking());
    }
}
