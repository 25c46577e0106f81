use crate::base::Base;
use crate::lifecycle::ProcedureStatus;
use chrono::{DateTime, Utc};
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub status: ProcedureStatus,
    pub scheduled_at: DateTime<Utc>,
    pub protocol_id: EntityId,
    pub project_id: Option<EntityId>,
    pub cohort_id: Option<EntityId>,
    pub organism_ids: Vec<EntityId>,
    pub treatment_ids: Vec<EntityId>,
    pub observation_ids: Vec<EntityId>,
}

impl Procedure {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Procedure.name must not be empty"));
        }
        if self.protocol_id.is_blank() {
            return Err(CoreError::validation("Procedure.protocol_id is required"));
        }
        Ok(())
    }
}
