use crate::base::Base;
use crate::lifecycle::TreatmentStatus;
use chrono::{DateTime, Utc};
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdministrationEntry {
    pub administered_at: DateTime<Utc>,
    pub dose: String,
    pub administered_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdverseEvent {
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub status: TreatmentStatus,
    pub procedure_id: EntityId,
    pub organism_ids: Vec<EntityId>,
    pub cohort_ids: Vec<EntityId>,
    pub dosage_plan: String,
    pub administration_log: Vec<AdministrationEntry>,
    pub adverse_events: Vec<AdverseEvent>,
}

impl Treatment {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Treatment.name must not be empty"));
        }
        if self.procedure_id.is_blank() {
            return Err(CoreError::validation("Treatment.procedure_id is required"));
        }
        Ok(())
    }
}
