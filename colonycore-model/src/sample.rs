use crate::base::Base;
use crate::lifecycle::SampleStatus;
use chrono::{DateTime, Utc};
use colonycore_base::{AttrMap, CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyEntry {
    pub actor: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(flatten)]
    pub base: Base,
    pub identifier: String,
    pub source_type: String,
    pub organism_id: Option<EntityId>,
    pub cohort_id: Option<EntityId>,
    pub facility_id: EntityId,
    pub collected_at: DateTime<Utc>,
    pub status: SampleStatus,
    pub storage_location: String,
    pub assay_type: String,
    pub chain_of_custody: Vec<CustodyEntry>,
    pub attributes: AttrMap,
}

impl Sample {
    pub fn validate(&self) -> CoreResult<()> {
        if self.identifier.trim().is_empty() {
            return Err(CoreError::validation("Sample.identifier must not be empty"));
        }
        if self.facility_id.is_blank() {
            return Err(CoreError::validation("Sample.facility_id is required"));
        }
        Ok(())
    }
}
