use crate::base::Base;
use colonycore_base::{AttrMap, CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub name: String,
    pub zone: String,
    pub access_policy: String,
    pub environment_baselines: AttrMap,
    pub housing_unit_ids: Vec<EntityId>,
    pub project_ids: Vec<EntityId>,
}

impl Facility {
    pub fn validate(&self) -> CoreResult<()> {
        if self.code.trim().is_empty() {
            return Err(CoreError::validation("Facility.code must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Facility.name must not be empty"));
        }
        Ok(())
    }
}
