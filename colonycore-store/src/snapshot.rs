use std::collections::BTreeMap;

use colonycore_base::EntityId;
use colonycore_model::{
    BreedingUnit, Cohort, Entity, Facility, GenotypeMarker, HousingUnit, Line, Observation,
    Organism, Permit, Procedure, Project, Protocol, Sample, Strain, SupplyItem, Treatment,
};
use serde::{Deserialize, Serialize};

macro_rules! snapshot {
    ($($field:ident : $ty:ty),+ $(,)?) => {
        /// The full entity set at one point in time. One `BTreeMap` per entity type, keyed by
        /// id, rather than an open inheritance hierarchy (§9's "heterogeneous entity set" note).
        ///
        /// Import is tolerant of a document missing sections (`#[serde(default)]`); export
        /// always emits every section, possibly empty.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct Snapshot {
            $(
                #[serde(default)]
                pub $field: BTreeMap<EntityId, $ty>,
            )+
        }

        $(
            impl EntityMap for $ty {
                fn map(snapshot: &Snapshot) -> &BTreeMap<EntityId, Self> {
                    &snapshot.$field
                }

                fn map_mut(snapshot: &mut Snapshot) -> &mut BTreeMap<EntityId, Self> {
                    &mut snapshot.$field
                }
            }
        )+
    };
}

/// Implemented per entity type so generic Store/Transaction code can reach the right bucket
/// of a [`Snapshot`] without a runtime type tag.
pub trait EntityMap: Entity {
    fn map(snapshot: &Snapshot) -> &BTreeMap<EntityId, Self>;
    fn map_mut(snapshot: &mut Snapshot) -> &mut BTreeMap<EntityId, Self>;
}

snapshot! {
    facilities: Facility,
    housing_units: HousingUnit,
    organisms: Organism,
    cohorts: Cohort,
    breeding_units: BreedingUnit,
    protocols: Protocol,
    procedures: Procedure,
    treatments: Treatment,
    observations: Observation,
    samples: Sample,
    permits: Permit,
    supply_items: SupplyItem,
    projects: Project,
    lines: Line,
    strains: Strain,
    genotype_markers: GenotypeMarker,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn import_tolerates_missing_sections() {
        let doc = serde_json::json!({ "organisms": {} });
        let snapshot: Snapshot = serde_json::from_value(doc).expect("missing sections default");
        assert!(snapshot.facilities.is_empty());
        assert!(snapshot.organisms.is_empty());
    }

    #[test]
    fn export_emits_every_section() {
        let snapshot = Snapshot::default();
        let value = serde_json::to_value(&snapshot).expect("serialize");
        let obj = value.as_object().expect("object");
        assert!(obj.contains_key("facilities"));
        assert!(obj.contains_key("genotype_markers"));
        assert_eq!(obj.len(), 16);
    }
}
