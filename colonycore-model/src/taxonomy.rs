use crate::base::Base;
use colonycore_base::{CoreError, CoreResult, EntityId};
use serde::{Deserialize, Serialize};

/// Auxiliary taxonomic identity records participating in lineage rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub species: String,
    pub description: Option<String>,
}

impl Line {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Line.name must not be empty"));
        }
        if self.species.trim().is_empty() {
            return Err(CoreError::validation("Line.species must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strain {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub line_id: Option<EntityId>,
    pub description: Option<String>,
}

impl Strain {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("Strain.name must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenotypeMarker {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub description: Option<String>,
}

impl GenotypeMarker {
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("GenotypeMarker.name must not be empty"));
        }
        Ok(())
    }
}
