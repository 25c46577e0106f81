use std::collections::{BTreeMap, BTreeSet};

use colonycore_base::CoreError;
use colonycore_base::CoreResult;
use colonycore_dataset::{BoundTemplate, Environment};
use colonycore_model::EntityKind;
use colonycore_rules::Rule;
use serde_json::Value;

use crate::plugin::{Plugin, PluginId};
use crate::registry::Registry;

/// Everything a successful install produced, ready for the host (`colonycore-service`) to
/// merge into its running engine, schema metadata, and template map. Nothing here is partly
/// applied: `install_plugin` either returns this whole bundle or an error, never a mix.
pub struct InstalledPlugin {
    pub id: PluginId,
    pub rules: Vec<Box<dyn Rule>>,
    pub schemas: BTreeMap<EntityKind, Value>,
    pub templates: Vec<BoundTemplate>,
}

/// Installs a plugin atomically (§4.4):
/// 1. the plugin must be named and not already installed;
/// 2. `Plugin::register` runs against a fresh staging `Registry`;
/// 3. every dataset template it submitted is bound against `env`, compiling its runner;
/// 4. only if every step above succeeded does the caller get anything to merge.
///
/// A binder error or a registration error both abort the whole install: the staging
/// `Registry` and any already-bound templates from this same call are simply dropped, so the
/// host's state is untouched on any `Err`.
pub fn install_plugin(
    plugin: &dyn Plugin,
    already_installed: &BTreeSet<String>,
    env: &Environment,
) -> CoreResult<InstalledPlugin> {
    let id = plugin.id();
    if id.name.trim().is_empty() {
        return Err(CoreError::plugin("plugin name must not be empty"));
    }
    if already_installed.contains(&id.name) {
        return Err(CoreError::plugin(format!("plugin {} is already installed", id.name)));
    }

    let mut staging = Registry::new();
    plugin.register(&mut staging)?;
    let (rules, schemas, templates) = staging.into_parts();

    let mut bound_templates = Vec::with_capacity(templates.len());
    for (slug, submission) in templates {
        let bound = BoundTemplate::new(submission.template, submission.binder)?;
        bound.bind(env).map_err(|err| CoreError::plugin(format!("binder for {slug} failed: {err}")))?;
        if !bound.is_bound() {
            return Err(CoreError::plugin(format!("binder for {slug} produced no runner")));
        }
        bound_templates.push(bound);
    }

    Ok(InstalledPlugin { id, rules, schemas, templates: bound_templates })
}
