use crate::base::Base;
use crate::lifecycle::ApprovalStatus;
use colonycore_base::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub max_subjects: u32,
    pub status: ApprovalStatus,
}

impl Protocol {
    pub fn validate(&self) -> CoreResult<()> {
        if self.code.trim().is_empty() {
            return Err(CoreError::validation("Protocol.code must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("Protocol.title must not be empty"));
        }
        Ok(())
    }
}
