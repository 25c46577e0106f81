use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A primitive leaf of an [`AttrValue`] tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// An open-ended attribute value, used for every `mapping string -> any` field in the data
/// model (Facility.EnvironmentBaselines, Organism.Attributes, Observation.Data, ...).
///
/// This is the closed shape set called for by the "deep clone of open-ended attribute maps"
/// design note: a mapping, three flavors of ordered sequence, or a primitive. Every variant is
/// owned data with no internal sharing, so `Clone` is already a deep clone; there is no separate
/// recursive-clone routine to get wrong.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Primitive(Primitive),
    Values(Vec<AttrValue>),
    Strings(Vec<String>),
    Mappings(Vec<BTreeMap<String, AttrValue>>),
    Mapping(BTreeMap<String, AttrValue>),
}

pub type AttrMap = BTreeMap<String, AttrValue>;

impl AttrValue {
    pub fn null() -> Self {
        AttrValue::Primitive(Primitive::Null)
    }

    pub fn string(s: impl Into<String>) -> Self {
        AttrValue::Primitive(Primitive::Str(s.into()))
    }

    pub fn int(v: i64) -> Self {
        AttrValue::Primitive(Primitive::Int(v))
    }

    pub fn float(v: f64) -> Self {
        AttrValue::Primitive(Primitive::Float(v))
    }

    pub fn bool(v: bool) -> Self {
        AttrValue::Primitive(Primitive::Bool(v))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Primitive(Primitive::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Primitive(Primitive::Int(i)) => Some(*i),
            AttrValue::Primitive(Primitive::Float(f)) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Primitive(Primitive::Float(f)) => Some(*f),
            AttrValue::Primitive(Primitive::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Primitive(Primitive::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clone_of_a_mapping_does_not_alias_the_original() {
        let mut map: AttrMap = BTreeMap::new();
        map.insert("a".to_string(), AttrValue::Values(vec![AttrValue::int(1), AttrValue::int(2)]));
        let original = AttrValue::Mapping(map);

        let mut copy = original.clone();
        if let AttrValue::Mapping(m) = &mut copy {
            if let Some(AttrValue::Values(vals)) = m.get_mut("a") {
                vals.push(AttrValue::int(3));
            }
        }

        if let AttrValue::Mapping(m) = &original {
            if let Some(AttrValue::Values(vals)) = m.get("a") {
                assert_eq!(vals.len(), 2, "mutating the clone must not affect the original");
            } else {
                panic!("expected nested Values");
            }
        }
    }

    #[test]
    fn round_trips_through_json() {
        let mut map: AttrMap = BTreeMap::new();
        map.insert("name".into(), AttrValue::string("tank-3"));
        map.insert("temp_c".into(), AttrValue::float(24.5));
        map.insert("tags".into(), AttrValue::Strings(vec!["humid".into(), "quiet".into()]));
        let value = AttrValue::Mapping(map);

        let json = serde_json::to_string(&value).expect("serialize");
        let back: AttrValue = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(value, back);
    }
}
