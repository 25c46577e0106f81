use crate::base::Base;
use crate::lifecycle::ApprovalStatus;
use chrono::{DateTime, Utc};
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permit {
    #[serde(flatten)]
    pub base: Base,
    pub permit_number: String,
    pub authority: String,
    pub status: ApprovalStatus,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub allowed_activities: Vec<String>,
    pub facility_ids: Vec<EntityId>,
    pub protocol_ids: Vec<EntityId>,
    pub notes: Option<String>,
}

impl Permit {
    pub fn validate(&self) -> CoreResult<()> {
        if self.permit_number.trim().is_empty() {
            return Err(CoreError::validation("Permit.permit_number must not be empty"));
        }
        if self.authority.trim().is_empty() {
            return Err(CoreError::validation("Permit.authority must not be empty"));
        }
        if self.valid_from > self.valid_until {
            return Err(CoreError::validation("Permit.valid_from must not be after valid_until"));
        }
        Ok(())
    }
}
