use crate::base::Base;
use crate::lifecycle::Stage;
use colonycore_base::{AttrMap, CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub species: String,
    pub line: String,
    pub line_id: Option<EntityId>,
    pub strain_id: Option<EntityId>,
    pub parent_ids: Vec<EntityId>,
    pub stage: Stage,
    pub cohort_id: Option<EntityId>,
    pub housing_id: Option<EntityId>,
    pub protocol_id: Option<EntityId>,
    pub project_id: Option<EntityId>,
    pub attributes: AttrMap,
}

impl Organism {
    /// Field-level checks only: uniqueness of the parent list. Existence of each parent,
    /// exclusion of self-parentage and species agreement require the Store's view and are
    /// enforced by the `lineage_integrity` rule at commit time, not here.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Organism.name must not be empty"));
        }
        if self.species.trim().is_empty() {
            return Err(CoreError::validation("Organism.species must not be empty"));
        }
        let mut seen = HashSet::new();
        for parent in &self.parent_ids {
            if !seen.insert(parent.as_str()) {
                return Err(CoreError::validation(format!(
                    "Organism.parent_ids contains duplicate id {parent}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    fn sample() -> Organism {
        Organism {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Specimen A".into(),
            species: "Danio rerio".into(),
            line: "wild-type".into(),
            line_id: None,
            strain_id: None,
            parent_ids: vec![],
            stage: Stage::Adult,
            cohort_id: None,
            housing_id: None,
            protocol_id: None,
            project_id: None,
            attributes: AttrMap::new(),
        }
    }

    #[test]
    fn duplicate_parent_ids_are_rejected() {
        let mut organism = sample();
        let parent = EntityId::generate();
        organism.parent_ids = vec![parent.clone(), parent];
        assert!(organism.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut organism = sample();
        organism.name = "  ".into();
        assert!(organism.validate().is_err());
    }
}
