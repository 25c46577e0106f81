use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque, globally-unique (within its entity type) identifier. The Store assigns one at
/// create time when the caller leaves it blank; external callers must never set their own
/// except to request a specific, checked-for-collision value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn generate() -> Self {
        EntityId(Uuid::new_v4().to_string())
    }

    pub fn new(raw: impl Into<String>) -> Self {
        EntityId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId(String::new())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn generated_ids_are_not_blank_and_differ() {
        let a = EntityId::generate();
        let b = EntityId::generate();
        assert!(!a.is_blank());
        assert_ne!(a, b);
    }

    #[test]
    fn default_id_is_blank_marker_for_caller_supplied_none() {
        assert!(EntityId::default().is_blank());
    }
}
