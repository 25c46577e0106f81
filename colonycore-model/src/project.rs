use crate::base::Base;
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub facility_ids: Vec<EntityId>,
    pub protocol_ids: Vec<EntityId>,
    pub organism_ids: Vec<EntityId>,
    pub procedure_ids: Vec<EntityId>,
    pub supply_item_ids: Vec<EntityId>,
}

impl Project {
    pub fn validate(&self) -> CoreResult<()> {
        if self.code.trim().is_empty() {
            return Err(CoreError::validation("Project.code must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("Project.title must not be empty"));
        }
        Ok(())
    }
}
