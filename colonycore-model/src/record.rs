use crate::{
    BreedingUnit, Cohort, Facility, GenotypeMarker, HousingUnit, Line, Observation, Organism,
    Permit, Procedure, Project, Protocol, Sample, Strain, SupplyItem, Treatment,
};
use colonycore_base::{CoreResult, EntityId};
use serde::{Deserialize, Serialize};

/// Tags which entity type a record belongs to, independent of any particular payload
/// representation. Used by the Store to key its per-type snapshot maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Facility,
    HousingUnit,
    Organism,
    Cohort,
    BreedingUnit,
    Protocol,
    Procedure,
    Treatment,
    Observation,
    Sample,
    Permit,
    SupplyItem,
    Project,
    Line,
    Strain,
    GenotypeMarker,
}

impl EntityKind {
    pub const ALL: [EntityKind; 16] = [
        EntityKind::Facility,
        EntityKind::HousingUnit,
        EntityKind::Organism,
        EntityKind::Cohort,
        EntityKind::BreedingUnit,
        EntityKind::Protocol,
        EntityKind::Procedure,
        EntityKind::Treatment,
        EntityKind::Observation,
        EntityKind::Sample,
        EntityKind::Permit,
        EntityKind::SupplyItem,
        EntityKind::Project,
        EntityKind::Line,
        EntityKind::Strain,
        EntityKind::GenotypeMarker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Facility => "Facility",
            EntityKind::HousingUnit => "HousingUnit",
            EntityKind::Organism => "Organism",
            EntityKind::Cohort => "Cohort",
            EntityKind::BreedingUnit => "BreedingUnit",
            EntityKind::Protocol => "Protocol",
            EntityKind::Procedure => "Procedure",
            EntityKind::Treatment => "Treatment",
            EntityKind::Observation => "Observation",
            EntityKind::Sample => "Sample",
            EntityKind::Permit => "Permit",
            EntityKind::SupplyItem => "SupplyItem",
            EntityKind::Project => "Project",
            EntityKind::Line => "Line",
            EntityKind::Strain => "Strain",
            EntityKind::GenotypeMarker => "GenotypeMarker",
        }
    }
}

/// Implemented by every entity struct. `KIND` lets generic Store code (`get::<E>`,
/// `list::<E>`, `create::<E>`) pick the right bucket and the right `EntityRecord` variant
/// without a runtime type tag or a per-entity-type method on the Store.
pub trait Entity: Clone + Send + Sync + Into<EntityRecord> + 'static
where
    for<'a> &'a Self: TryFrom<&'a EntityRecord>,
{
    const KIND: EntityKind;

    fn base(&self) -> &crate::base::Base;
    fn base_mut(&mut self) -> &mut crate::base::Base;
    fn validate(&self) -> CoreResult<()>;
}

macro_rules! entity_record {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// A closed union over every entity type. This is what the Store stores, what
        /// `ChangePayload` wraps, and the only thing a rule ever decodes a payload into —
        /// decoding is a `match`, not a reflective any-cast.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "kind", content = "value")]
        pub enum EntityRecord {
            $($variant($ty)),+
        }

        impl EntityRecord {
            pub fn kind(&self) -> EntityKind {
                match self {
                    $(EntityRecord::$variant(_) => EntityKind::$variant),+
                }
            }

            pub fn id(&self) -> &EntityId {
                match self {
                    $(EntityRecord::$variant(e) => &e.base.id),+
                }
            }

            pub fn validate(&self) -> CoreResult<()> {
                match self {
                    $(EntityRecord::$variant(e) => e.validate()),+
                }
            }
        }

        $(
            impl From<$ty> for EntityRecord {
                fn from(value: $ty) -> Self {
                    EntityRecord::$variant(value)
                }
            }

            impl<'a> TryFrom<&'a EntityRecord> for &'a $ty {
                type Error = ();

                fn try_from(record: &'a EntityRecord) -> Result<Self, Self::Error> {
                    match record {
                        EntityRecord::$variant(e) => Ok(e),
                        _ => Err(()),
                    }
                }
            }

            impl TryFrom<EntityRecord> for $ty {
                type Error = ();

                fn try_from(record: EntityRecord) -> Result<Self, Self::Error> {
                    match record {
                        EntityRecord::$variant(e) => Ok(e),
                        _ => Err(()),
                    }
                }
            }

            impl Entity for $ty {
                const KIND: EntityKind = EntityKind::$variant;

                fn base(&self) -> &crate::base::Base {
                    &self.base
                }

                fn base_mut(&mut self) -> &mut crate::base::Base {
                    &mut self.base
                }

                fn validate(&self) -> CoreResult<()> {
                    <$ty>::validate(self)
                }
            }
        )+
    };
}

entity_record! {
    Facility(Facility),
    HousingUnit(HousingUnit),
    Organism(Organism),
    Cohort(Cohort),
    BreedingUnit(BreedingUnit),
    Protocol(Protocol),
    Procedure(Procedure),
    Treatment(Treatment),
    Observation(Observation),
    Sample(Sample),
    Permit(Permit),
    SupplyItem(SupplyItem),
    Project(Project),
    Line(Line),
    Strain(Strain),
    GenotypeMarker(GenotypeMarker),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::base::Base;
    use chrono::Utc;

    #[test]
    fn decoding_against_the_wrong_type_fails_cleanly() {
        let facility = Facility {
            base: Base::new(EntityId::generate(), Utc::now()),
            code: "F1".into(),
            name: "Main".into(),
            zone: "north".into(),
            access_policy: "restricted".into(),
            environment_baselines: Default::default(),
            housing_unit_ids: vec![],
            project_ids: vec![],
        };
        let record: EntityRecord = facility.into();
        assert_eq!(record.kind(), EntityKind::Facility);

        let as_organism: Result<&Organism, ()> = (&record).try_into();
        assert!(as_organism.is_err());
    }
}
