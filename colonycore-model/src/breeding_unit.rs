use crate::base::Base;
use colonycore_base::{AttrMap, CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingUnit {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub strategy: String,
    pub housing_id: Option<EntityId>,
    pub protocol_id: Option<EntityId>,
    pub line_id: Option<EntityId>,
    pub strain_id: Option<EntityId>,
    pub target_line_id: Option<EntityId>,
    pub target_strain_id: Option<EntityId>,
    pub pairing_intent: Option<String>,
    pub pairing_notes: Option<String>,
    pub pairing_attributes: AttrMap,
    pub female_ids: Vec<EntityId>,
    pub male_ids: Vec<EntityId>,
}

impl BreedingUnit {
    /// Existence and species agreement of the referenced organisms is a view-level check
    /// (`lineage_integrity`); what's checkable here is the structural rule that no organism
    /// appears in both roles at once.
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("BreedingUnit.name must not be empty"));
        }
        let females: HashSet<&str> = self.female_ids.iter().map(EntityId::as_str).collect();
        for male in &self.male_ids {
            if females.contains(male.as_str()) {
                return Err(CoreError::validation(format!(
                    "BreedingUnit cannot assign organism {male} to both female_ids and male_ids"
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

    #[test]
    fn an_organism_cannot_be_both_female_and_male() {
        let shared = EntityId::generate();
        let unit = BreedingUnit {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Pair 1".into(),
            strategy: "pair".into(),
            housing_id: None,
            protocol_id: None,
            line_id: None,
            strain_id: None,
            target_line_id: None,
            target_strain_id: None,
            pairing_intent: None,
            pairing_notes: None,
            pairing_attributes: AttrMap::new(),
            female_ids: vec![shared.clone()],
            male_ids: vec![shared],
        };
        assert!(unit.validate().is_err());
    }
}
