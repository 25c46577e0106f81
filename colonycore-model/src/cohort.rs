use crate::base::Base;
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub purpose: String,
    pub project_id: Option<EntityId>,
    pub housing_id: Option<EntityId>,
    pub protocol_id: Option<EntityId>,
}

impl Cohort {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Cohort.name must not be empty"));
        }
        Ok(())
    }
}
