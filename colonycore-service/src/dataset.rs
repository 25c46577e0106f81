use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use colonycore_auth::Scope;
use colonycore_base::{CoreError, CoreResult};
use colonycore_dataset::{BoundTemplate, DatasetOutcome, Environment, OutputFormat, TemplateDescriptor};
use colonycore_registry::{install_plugin, InstalledPlugin, Plugin};
use colonycore_store::Store;
use parking_lot::RwLock;
use serde_json::Value;

/// Everything the Service owns on behalf of `colonycore-registry`/`colonycore-dataset`:
/// bound templates keyed by slug, the names of already-installed plugins, and plugin-merged
/// schema metadata. Kept as one struct so `Service::install_plugin` can lock, update, and
/// unlock each piece without threading three separate `RwLock`s through its body.
#[derive(Default)]
pub struct DatasetRegistry {
    templates: RwLock<BTreeMap<String, BoundTemplate>>,
    installed_plugins: RwLock<BTreeSet<String>>,
    schemas: RwLock<BTreeMap<colonycore_model::EntityKind, Value>>,
}

impl DatasetRegistry {
    pub fn new() -> Self {
        DatasetRegistry::default()
    }

    /// Installs a plugin per §4.4: `colonycore_registry::install_plugin` already validated
    /// the name and bound every submitted template against `env`, so the only thing left to
    /// reject here is a slug collision against templates a *different* plugin already
    /// published (the registry only guards against collisions within one plugin's own
    /// submission). Either every template gets published and the plugin is marked installed,
    /// or nothing here is mutated at all.
    pub fn install(&self, plugin: &dyn Plugin, env: &Environment) -> CoreResult<InstalledPlugin> {
        let already = self.installed_plugins.read().clone();
        let mut installed = install_plugin(plugin, &already, env)?;

        {
            let templates = self.templates.read();
            for template in &installed.templates {
                let slug = template.template.slug();
                if templates.contains_key(&slug) {
                    return Err(CoreError::plugin(format!("dataset template slug {slug} already published")));
                }
            }
        }

        let published: Vec<(String, BoundTemplate)> =
            installed.templates.drain(..).map(|bound| (bound.template.slug(), bound)).collect();
        {
            let mut templates = self.templates.write();
            for (slug, bound) in published {
                templates.insert(slug, bound);
            }
        }
        self.schemas.write().extend(installed.schemas.clone());
        self.installed_plugins.write().insert(installed.id.name.clone());
        Ok(installed)
    }

    pub fn descriptors(&self) -> Vec<TemplateDescriptor> {
        let mut descriptors: Vec<_> =
            self.templates.read().values().map(|bound| bound.template.descriptor()).collect();
        descriptors.sort();
        descriptors
    }

    pub fn supports_format(&self, slug: &str, format: OutputFormat) -> Option<bool> {
        self.templates.read().get(slug).map(|bound| bound.supports_format(format))
    }

    pub fn run(
        &self,
        slug: &str,
        raw_parameters: &BTreeMap<String, Value>,
        scope: Scope,
        format: OutputFormat,
        clock: &dyn colonycore_base::Clock,
    ) -> CoreResult<DatasetOutcome> {
        let templates = self.templates.read();
        let bound = templates
            .get(slug)
            .ok_or_else(|| CoreError::dataset(format!("dataset template {slug} is not published")))?;
        bound.execute(raw_parameters, scope, format, clock)
    }

    pub fn schema_for(&self, kind: colonycore_model::EntityKind) -> Option<Value> {
        self.schemas.read().get(&kind).cloned()
    }

    pub fn is_installed(&self, plugin_name: &str) -> bool {
        self.installed_plugins.read().contains(plugin_name)
    }
}

pub fn environment(clock: Arc<dyn colonycore_base::Clock>, store: Arc<Store>) -> Environment {
    Environment::new(clock, store as Arc<dyn std::any::Any + Send + Sync>)
}
