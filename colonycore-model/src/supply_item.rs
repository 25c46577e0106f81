use crate::base::Base;
use chrono::{DateTime, Utc};
use colonycore_base::{AttrMap, CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyItem {
    #[serde(flatten)]
    pub base: Base,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity_on_hand: u32,
    pub unit: String,
    pub lot_number: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub facility_ids: Vec<EntityId>,
    pub project_ids: Vec<EntityId>,
    pub reorder_level: u32,
    pub attributes: AttrMap,
}

impl SupplyItem {
    pub fn validate(&self) -> CoreResult<()> {
        if self.sku.trim().is_empty() {
            return Err(CoreError::validation("SupplyItem.sku must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("SupplyItem.name must not be empty"));
        }
        Ok(())
    }
}
