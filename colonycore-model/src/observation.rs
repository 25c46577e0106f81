use crate::base::Base;
use chrono::{DateTime, Utc};
use colonycore_base::{AttrMap, CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(flatten)]
    pub base: Base,
    pub procedure_id: Option<EntityId>,
    pub organism_id: Option<EntityId>,
    pub cohort_id: Option<EntityId>,
    pub recorded_at: DateTime<Utc>,
    pub observer: String,
    pub data: AttrMap,
    pub notes: Option<String>,
}

impl Observation {
    pub fn validate(&self) -> CoreResult<()> {
        if self.observer.trim().is_empty() {
            return Err(CoreError::validation("Observation.observer must not be empty"));
        }
        if self.procedure_id.is_none() && self.organism_id.is_none() && self.cohort_id.is_none() {
            return Err(CoreError::validation(
                "Observation must reference at least one of procedure_id, organism_id, cohort_id",
            ));
        }
        Ok(())
    }
}
