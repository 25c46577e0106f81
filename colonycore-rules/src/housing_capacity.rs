use colonycore_base::{CoreResult, RuleResult, Severity, Violation};
use colonycore_model::{HousingUnit, Organism};
use colonycore_store::{Change, RuleView};

use crate::engine::Rule;

/// For each HousingUnit, the number of organisms housed there must not exceed its capacity.
pub struct HousingCapacity;

impl Rule for HousingCapacity {
    fn name(&self) -> &str {
        "housing_capacity"
    }

    fn evaluate(&self, view: &RuleView, _changes: &[Change], result: &mut RuleResult) -> CoreResult<()> {
        let organisms = view.list::<Organism>();
        for unit in view.list::<HousingUnit>() {
            let occupancy =
                organisms.iter().filter(|o| o.housing_id.as_ref() == Some(&unit.base.id)).count() as u32;
            if occupancy > unit.capacity {
                result.push(Violation::new(
                    self.name(),
                    Severity::Block,
                    format!(
                        "housing unit {} holds {occupancy} organisms, over capacity {}",
                        unit.base.id, unit.capacity
                    ),
                    "HousingUnit",
                    unit.base.id.to_string(),
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
    use colonycore_model::{Base, HousingEnvironment, HousingState, Stage};
    use colonycore_store::Snapshot;
    use std::sync::Arc;

    fn housing(id: &EntityId, capacity: u32) -> HousingUnit {
        HousingUnit {
            base: Base::new(id.clone(), Utc::now()),
            name: "Tank".into(),
            facility_id: EntityId::generate(),
            capacity,
            environment: HousingEnvironment::Aquatic,
            state: HousingState::Active,
        }
    }

    fn organism(housing_id: &EntityId) -> Organism {
        Organism {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Fish".into(),
            species: "Danio rerio".into(),
            line: "wt".into(),
            line_id: None,
            strain_id: None,
            parent_ids: vec![],
            stage: Stage::Adult,
            cohort_id: None,
            housing_id: Some(housing_id.clone()),
            protocol_id: None,
            project_id: None,
            attributes: Default::default(),
        }
    }

    #[test]
    fn overflow_blocks_commit() {
        let unit_id = EntityId::generate();
        let mut snapshot = Snapshot::default();
        snapshot.housing_units.insert(unit_id.clone(), housing(&unit_id, 1));
        snapshot.organisms.insert(EntityId::generate(), organism(&unit_id));
        let second = organism(&unit_id);
        snapshot.organisms.insert(second.base.id.clone(), second);

        let view = RuleView::new(Arc::new(snapshot));
        let mut result = RuleResult::new();
        HousingCapacity.evaluate(&view, &[], &mut result).expect("evaluate");
        assert!(result.has_blocking());
        assert_eq!(result.violations[0].rule, "housing_capacity");
    }

    #[test]
    fn at_capacity_does_not_block() {
        let unit_id = EntityId::generate();
        let mut snapshot = Snapshot::default();
        snapshot.housing_units.insert(unit_id.clone(), housing(&unit_id, 1));
        let o = organism(&unit_id);
        snapshot.organisms.insert(o.base.id.clone(), o);

        let view = RuleView::new(Arc::new(snapshot));
        let mut result = RuleResult::new();
        HousingCapacity.evaluate(&view, &[], &mut result).expect("evaluate");
        assert!(!result.has_blocking());
    }
}
