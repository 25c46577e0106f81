use colonycore_model::{EntityKind, EntityRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// An opaque carrier for an entity's pre- or post-image. `Absent` covers both "undefined"
/// (a Create has no before-image) and "empty" uniformly, per §4.2's "(b) undefined or empty
/// payloads yield not present".
///
/// Rust re-architecture of the spec's "opaque payload decoded on demand": rather than a
/// reflective any-cast, `decode::<E>` is a type-directed `match` through `EntityRecord`'s
/// existing `TryFrom<&EntityRecord> for &E` impls (one per entity, generated in
/// `colonycore-model`). Decoding against the wrong entity type, or against `Absent`, both
/// fail cleanly by returning `None` rather than panicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangePayload {
    Absent,
    Record(EntityRecord),
}

impl ChangePayload {
    pub fn of(record: EntityRecord) -> Self {
        ChangePayload::Record(record)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, ChangePayload::Record(_))
    }

    /// Decode against a specific entity type. Values are cloned out, so the result cannot
    /// retain a reference into store state (§4.2's "value-copy-safe" guarantee).
    pub fn decode<E>(&self) -> Option<E>
    where
        E: Clone,
        for<'a> &'a E: TryFrom<&'a EntityRecord>,
    {
        match self {
            ChangePayload::Record(record) => <&E>::try_from(record).ok().cloned(),
            ChangePayload::Absent => None,
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            ChangePayload::Record(record) => Some(record.kind()),
            ChangePayload::Absent => None,
        }
    }

    pub fn record_id(&self) -> Option<colonycore_base::EntityId> {
        match self {
            ChangePayload::Record(record) => Some(record.id().clone()),
            ChangePayload::Absent => None,
        }
    }
}

/// One mutation enlisted by a transaction: which entity type, which action, and its
/// pre/post images, in the exact order issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: EntityKind,
    pub action: Action,
    pub before: ChangePayload,
    pub after: ChangePayload,
}

impl Change {
    pub fn new(kind: EntityKind, action: Action, before: ChangePayload, after: ChangePayload) -> Self {
        Change { kind, action, before, after }
    }
}
