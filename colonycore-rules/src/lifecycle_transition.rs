use colonycore_base::{CoreResult, RuleResult, Severity, Violation};
use colonycore_model::{
    ApprovalStatus, EntityKind, HousingState, LifecycleState, Permit, Procedure, ProcedureStatus,
    Sample, SampleStatus, Stage, TreatmentStatus,
};
use colonycore_store::{Action, Change, ChangePayload, RuleView};

use crate::engine::Rule;

/// One lifecycle state, tagged by which entity kind it came from. Rust's type system already
/// guarantees "After-state is in its declared valid set" (a `HousingState`/`Stage`/...  value
/// can only ever be one of its declared variants), so the only runtime check this rule
/// performs is (ii): a terminal Before-state forbids any further transition.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StateTag {
    Housing(HousingState),
    Stage(Stage),
    Approval(ApprovalStatus),
    Procedure(ProcedureStatus),
    Treatment(TreatmentStatus),
    Sample(SampleStatus),
}

impl StateTag {
    fn is_terminal(&self) -> bool {
        match self {
            StateTag::Housing(s) => s.is_terminal(),
            StateTag::Stage(s) => s.is_terminal(),
            StateTag::Approval(s) => s.is_terminal(),
            StateTag::Procedure(s) => s.is_terminal(),
            StateTag::Treatment(s) => s.is_terminal(),
            StateTag::Sample(s) => s.is_terminal(),
        }
    }
}

fn extract_state(kind: EntityKind, payload: &ChangePayload) -> Option<StateTag> {
    use colonycore_model::{HousingUnit, Organism, Protocol, Treatment};
    match kind {
        EntityKind::HousingUnit => payload.decode::<HousingUnit>().map(|e| StateTag::Housing(e.state)),
        EntityKind::Organism => payload.decode::<Organism>().map(|e| StateTag::Stage(e.stage)),
        EntityKind::Protocol => payload.decode::<Protocol>().map(|e| StateTag::Approval(e.status)),
        EntityKind::Permit => payload.decode::<Permit>().map(|e| StateTag::Approval(e.status)),
        EntityKind::Procedure => payload.decode::<Procedure>().map(|e| StateTag::Procedure(e.status)),
        EntityKind::Treatment => payload.decode::<Treatment>().map(|e| StateTag::Treatment(e.status)),
        EntityKind::Sample => payload.decode::<Sample>().map(|e| StateTag::Sample(e.status)),
        _ => None,
    }
}

/// Generic over "does this entity kind declare a state/status enum with a terminal set" —
/// every stateful entity participates without bespoke per-kind wiring (§9's open-question
/// decision).
pub struct LifecycleTransition;

impl Rule for LifecycleTransition {
    fn name(&self) -> &str {
        "lifecycle_transition"
    }

    fn evaluate(&self, _view: &RuleView, changes: &[Change], result: &mut RuleResult) -> CoreResult<()> {
        for change in changes {
            if change.action != Action::Update {
                continue;
            }
            let (Some(before), Some(after)) =
                (extract_state(change.kind, &change.before), extract_state(change.kind, &change.after))
            else {
                continue;
            };
            if before.is_terminal() && before != after {
                let entity_id = change.after.record_id().unwrap_or_default();
                result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!("{} is in a terminal state and cannot transition further", change.kind.as_str()),
                    change.kind.as_str(),
                    entity_id.to_string(),
                ));
            }
        }
        Ok(())
    }
}
