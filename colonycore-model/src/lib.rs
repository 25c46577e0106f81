mod base;
mod breeding_unit;
mod cohort;
mod facility;
mod housing_unit;
mod lifecycle;
mod observation;
mod organism;
mod permit;
mod procedure;
mod project;
mod protocol;
mod record;
mod sample;
mod supply_item;
mod taxonomy;
mod treatment;

pub use base::Base;
pub use breeding_unit::BreedingUnit;
pub use cohort::Cohort;
pub use facility::Facility;
pub use housing_unit::HousingUnit;
pub use lifecycle::{
    ApprovalStatus, HousingEnvironment, HousingState, LifecycleState, ProcedureStatus,
    SampleStatus, Stage, TreatmentStatus,
};
pub use observation::Observation;
pub use organism::Organism;
pub use permit::Permit;
pub use procedure::Procedure;
pub use project::Project;
pub use protocol::Protocol;
pub use record::{Entity, EntityKind, EntityRecord};
pub use sample::{CustodyEntry, Sample};
pub use supply_item::SupplyItem;
pub use taxonomy::{GenotypeMarker, Line, Strain};
pub use treatment::{AdministrationEntry, AdverseEvent, Treatment};
