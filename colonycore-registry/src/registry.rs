use std::collections::BTreeMap;

use colonycore_base::{CoreError, CoreResult};
use colonycore_dataset::{Binder, DatasetTemplate};
use colonycore_model::EntityKind;
use colonycore_rules::Rule;
use serde_json::Value;

/// A dataset template paired with the binder that compiles it. Kept together because a
/// `Binder` is a closure and cannot itself be stored inside `DatasetTemplate` alongside its
/// otherwise-serializable fields (§4.5 lists Binder as part of a template's definition; this
/// crate keeps the two next to each other instead, since a boxed closure can't derive
/// `Serialize`/`PartialEq` the way the rest of `DatasetTemplate` does).
pub struct TemplateSubmission {
    pub template: DatasetTemplate,
    pub binder: Binder,
}

/// Accumulates everything a plugin contributes during registration. A fresh `Registry` is
/// used as a staging area for each install attempt (§4.4 step 2); nothing here is visible to
/// the host until the whole install succeeds.
#[derive(Default)]
pub struct Registry {
    rules: Vec<Box<dyn Rule>>,
    schemas: BTreeMap<EntityKind, Value>,
    templates: BTreeMap<String, TemplateSubmission>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn register_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Last write wins for a repeated entity type within one plugin's registration; the spec
    /// gives duplicate-schema semantics no special treatment the way it does for dataset
    /// template slugs.
    pub fn register_schema(&mut self, entity: EntityKind, schema: Value) {
        self.schemas.insert(entity, schema);
    }

    pub fn register_dataset_template(&mut self, template: DatasetTemplate, binder: Binder) -> CoreResult<()> {
        template.validate()?;
        let slug = template.slug();
        if self.templates.contains_key(&slug) {
            return Err(CoreError::plugin(format!("duplicate dataset template slug: {slug}")));
        }
        self.templates.insert(slug, TemplateSubmission { template, binder });
        Ok(())
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<Box<dyn Rule>>, BTreeMap<EntityKind, Value>, BTreeMap<String, TemplateSubmission>) {
        (self.rules, self.schemas, self.templates)
    }
}
