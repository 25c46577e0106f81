use std::cmp::Ordering;
use std::collections::BTreeSet;

use colonycore_base::{AttrMap, CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use crate::param::{ParamDef, ParamType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Sql,
    Dsl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Csv,
    Parquet,
    Png,
    Html,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputColumn {
    pub name: String,
    pub column_type: ParamType,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,
}

impl OutputColumn {
    pub fn new(name: impl Into<String>, column_type: ParamType) -> Self {
        OutputColumn { name: name.into(), column_type, unit: None, description: None, format: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateMetadata {
    pub source: Option<String>,
    pub documentation: Option<String>,
    pub refresh_interval: Option<String>,
    pub tags: Vec<String>,
    #[serde(default)]
    pub annotations: AttrMap,
}

/// Identifies a template without carrying its query text or binder, for listings and for the
/// request a runner receives (§4.5.1's `RunRequest.Template`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub plugin: String,
    pub key: String,
    pub version: String,
    pub title: String,
    pub slug: String,
}

impl PartialOrd for TemplateDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by (Plugin, Key, Version) only, per the registry's canonical listing order — two
/// descriptors with the same coordinates but different titles are still "the same slot".
impl Ord for TemplateDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.plugin, &self.key, &self.version).cmp(&(&other.plugin, &other.key, &other.version))
    }
}

/// A dataset template: a named, versioned query with a declared parameter schema and a set of
/// output formats it can render into. Unbound until a `Binder` turns it into a `BoundTemplate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetTemplate {
    pub plugin: String,
    pub key: String,
    pub version: String,
    pub title: String,
    pub description: Option<String>,
    pub dialect: Dialect,
    pub query: String,
    pub parameters: Vec<ParamDef>,
    pub columns: Vec<OutputColumn>,
    pub metadata: TemplateMetadata,
    pub output_formats: BTreeSet<OutputFormat>,
}

impl DatasetTemplate {
    pub fn slug(&self) -> String {
        let plugin = self.plugin.trim();
        let key = self.key.trim();
        let version = self.version.trim();
        if plugin.is_empty() {
            format!("{key}@{version}")
        } else {
            format!("{plugin}/{key}@{version}")
        }
    }

    pub fn descriptor(&self) -> TemplateDescriptor {
        TemplateDescriptor {
            plugin: self.plugin.clone(),
            key: self.key.clone(),
            version: self.version.clone(),
            title: self.title.clone(),
            slug: self.slug(),
        }
    }

    pub fn supports_format(&self, format: OutputFormat) -> bool {
        self.output_formats.contains(&format)
    }

    /// Field-level validation only — the things a template author can get wrong before a
    /// binder ever runs. Whether the query text is actually well-formed SQL or DSL is the
    /// binder's problem to discover when it compiles the template.
    pub fn validate(&self) -> CoreResult<()> {
        if self.key.trim().is_empty() {
            return Err(CoreError::validation("dataset template key must not be empty"));
        }
        if self.version.trim().is_empty() {
            return Err(CoreError::validation("dataset template version must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("dataset template title must not be empty"));
        }
        if self.query.trim().is_empty() {
            return Err(CoreError::validation("dataset template query must not be empty"));
        }
        if self.columns.is_empty() {
            return Err(CoreError::validation("dataset template must declare at least one column"));
        }
        if self.output_formats.is_empty() {
            return Err(CoreError::validation("dataset template must declare at least one output format"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn minimal() -> DatasetTemplate {
        DatasetTemplate {
            plugin: "census".to_string(),
            key: "roster".to_string(),
            version: "1".to_string(),
            title: "Roster".to_string(),
            description: None,
            dialect: Dialect::Sql,
            query: "select * from organisms".to_string(),
            parameters: vec![],
            columns: vec![OutputColumn::new("id", ParamType::String)],
            metadata: TemplateMetadata::default(),
            output_formats: BTreeSet::from([OutputFormat::Json]),
        }
    }

    #[test]
    fn slug_joins_plugin_key_version() {
        assert_eq!(minimal().slug(), "census/roster@1");
    }

    #[test]
    fn slug_omits_plugin_when_empty() {
        let mut template = minimal();
        template.plugin = String::new();
        assert_eq!(template.slug(), "roster@1");
    }

    #[test]
    fn validate_rejects_empty_columns() {
        let mut template = minimal();
        template.columns.clear();
        assert!(template.validate().is_err());
    }

    #[test]
    fn validate_rejects_no_output_formats() {
        let mut template = minimal();
        template.output_formats.clear();
        assert!(template.validate().is_err());
    }

    #[test]
    fn descriptors_order_by_plugin_key_version() {
        let a = minimal().descriptor();
        let mut other = minimal();
        other.key = "zzz".to_string();
        let b = other.descriptor();
        assert!(a < b);
    }
}
