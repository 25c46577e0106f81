use std::fmt;

use colonycore_base::CoreResult;

use crate::registry::Registry;

/// Identifies an installed plugin by the two opaque strings the spec names: Name and
/// Version. A `semver::Version` was deliberately not reached for here — the spec treats
/// Version as an equality/ordering key, not a range to be satisfied, so a plain string pair
/// is the faithful rendition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginId {
    pub name: String,
    pub version: String,
}

impl PluginId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        PluginId { name: name.into(), version: version.into() }
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// An extension unit external to the core. A plugin's only contract is `register`: given a
/// staging `Registry`, it appends whatever rules, schemas, and dataset templates it provides.
/// It never sees the host's already-installed state, so it cannot collide with or depend on
/// install order of other plugins.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;

    fn id(&self) -> PluginId {
        PluginId::new(self.name(), self.version())
    }

    fn register(&self, registry: &mut Registry) -> CoreResult<()>;
}
