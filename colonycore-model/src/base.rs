use chrono::{DateTime, Utc};
use colonycore_base::EntityId;
use serde::{Deserialize, Serialize};

/// Fields every entity carries: identity plus the bitemporal pair the Store stamps at
/// create/update time. Entities embed this rather than deriving from it; Rust has no
/// record inheritance and composition reads closer to the wire format anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Base {
    pub fn new(id: EntityId, now: DateTime<Utc>) -> Self {
        Base { id, created_at: now, updated_at: now }
    }
}
