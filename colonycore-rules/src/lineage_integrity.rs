use std::collections::HashSet;

use colonycore_base::{CoreResult, EntityId, RuleResult, Severity, Violation};
use colonycore_model::{BreedingUnit, EntityKind, Organism};
use colonycore_store::{Action, Change, RuleView};

use crate::engine::Rule;

/// Organism-parentage and breeding-unit-pairing invariants (§3's "Lineage"). Organism checks
/// run over the full post-image view (a parent edited elsewhere in the same commit can change
/// whether an existing organism's lineage still holds); breeding-unit checks run over the
/// change set, since only newly created or edited pairings need re-checking.
pub struct LineageIntegrity;

impl Rule for LineageIntegrity {
    fn name(&self) -> &str {
        "lineage_integrity"
    }

    fn evaluate(&self, view: &RuleView, changes: &[Change], result: &mut RuleResult) -> CoreResult<()> {
        self.check_organisms(view, result);
        self.check_breeding_units(view, changes, result);
        Ok(())
    }
}

impl LineageIntegrity {
    fn check_organisms(&self, view: &RuleView, result: &mut RuleResult) {
        for organism in view.list::<Organism>() {
            if organism.parent_ids.iter().any(|p| p == &organism.base.id) {
                result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!("organism {} cannot be its own parent", organism.base.id),
                    "Organism",
                    organism.base.id.to_string(),
                ));
                continue;
            }
            for parent_id in &organism.parent_ids {
                let Some(parent) = view.get::<Organism>(parent_id) else {
                    result.push(Violation::new(
                        self.name(),
                        Severity::Block,
                        format!("organism {} references nonexistent parent {parent_id}", organism.base.id),
                        "Organism",
                        organism.base.id.to_string(),
                    ));
                    continue;
                };
                if parent.species != organism.species {
                    result.push(Violation::new(
                        self.name(),
                        Severity::Block,
                        format!(
                            "organism {} (species {}) has parent {parent_id} of species {}",
                            organism.base.id, organism.species, parent.species
                        ),
                        "Organism",
                        organism.base.id.to_string(),
                    ));
                }
                if let (Some(child_line), Some(parent_line)) = (&organism.line_id, &parent.line_id) {
                    if child_line != parent_line {
                        result.push(Violation::new(
                            self.name(),
                            Severity::Block,
                            format!("organism {} line_id does not match parent {parent_id}", organism.base.id),
                            "Organism",
                            organism.base.id.to_string(),
                        ));
                    }
                }
                if let (Some(child_strain), Some(parent_strain)) = (&organism.strain_id, &parent.strain_id) {
                    if child_strain != parent_strain {
                        result.push(Violation::new(
                            self.name(),
                            Severity::Block,
                            format!("organism {} strain_id does not match parent {parent_id}", organism.base.id),
                            "Organism",
                            organism.base.id.to_string(),
                        ));
                    }
                }
            }
        }
    }

    fn check_breeding_units(&self, view: &RuleView, changes: &[Change], result: &mut RuleResult) {
        for change in changes {
            if change.kind != EntityKind::BreedingUnit || change.action == Action::Delete {
                continue;
            }
            let Some(unit) = change.after.decode::<BreedingUnit>() else { continue };
            self.check_one_breeding_unit(view, &unit, result);
        }
    }

    fn check_one_breeding_unit(&self, view: &RuleView, unit: &BreedingUnit, result: &mut RuleResult) {
        let mut seen: HashSet<&EntityId> = HashSet::new();
        let members: Vec<&EntityId> = unit.female_ids.iter().chain(unit.male_ids.iter()).collect();

        let mut species: Option<String> = None;
        for member_id in &members {
            if !seen.insert(member_id) {
                result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!("breeding unit {} references organism {member_id} more than once", unit.base.id),
                    "BreedingUnit",
                    unit.base.id.to_string(),
                ));
                continue;
            }
            let Some(organism) = view.get::<Organism>(member_id) else {
                result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!("breeding unit {} references nonexistent organism {member_id}", unit.base.id),
                    "BreedingUnit",
                    unit.base.id.to_string(),
                ));
                continue;
            };
            match &species {
                None => species = Some(organism.species.clone()),
                Some(expected) if expected != &organism.species => {
                    result.push(Violation::new(
                        self.name(),
                        Severity::Block,
                        format!("breeding unit {} mixes species across its members", unit.base.id),
                        "BreedingUnit",
                        unit.base.id.to_string(),
                    ));
                }
                Some(_) => {}
            }
            if let Some(line_id) = &unit.line_id {
                if organism.line_id.as_ref() != Some(line_id) {
                    result.push(Violation::new(
                        self.name(),
                        Severity::Block,
                        format!(
                            "breeding unit {} declares line_id {line_id} not matched by organism {member_id}",
                            unit.base.id
                        ),
                        "BreedingUnit",
                        unit.base.id.to_string(),
                    ));
                }
            }
            if let Some(strain_id) = &unit.strain_id {
                if organism.strain_id.as_ref() != Some(strain_id) {
                    result.push(Violation::new(
                        self.name(),
                        Severity::Block,
                        format!(
                            "breeding unit {} declares strain_id {strain_id} not matched by organism {member_id}",
                            unit.base.id
                        ),
                        "BreedingUnit",
                        unit.base.id.to_string(),
                    ));
                }
            }
        }
    }
}
