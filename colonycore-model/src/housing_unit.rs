use crate::base::Base;
use crate::lifecycle::{HousingEnvironment, HousingState};
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingUnit {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub facility_id: EntityId,
    pub capacity: u32,
    pub environment: HousingEnvironment,
    pub state: HousingState,
}

impl HousingUnit {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("HousingUnit.name must not be empty"));
        }
        if self.facility_id.is_blank() {
            return Err(CoreError::validation("HousingUnit.facility_id is required"));
        }
        if self.capacity == 0 {
            return Err(CoreError::validation("HousingUnit.capacity must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Utc;

    fn sample() -> HousingUnit {
        HousingUnit {
            base: Base::new(EntityId::generate(), Utc::now()),
            name: "Tank 3".into(),
            facility_id: EntityId::generate(),
            capacity: 4,
            environment: HousingEnvironment::Aquatic,
            state: HousingState::Active,
        }
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut unit = sample();
        unit.capacity = 0;
        assert!(unit.validate().is_err());
    }

    #[test]
    fn blank_facility_id_is_rejected() {
        let mut unit = sample();
        unit.facility_id = EntityId::default();
        assert!(unit.validate().is_err());
    }
}
