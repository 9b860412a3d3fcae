//! Configuration value types
//!
//! Plain values as they are handed to, and read back from, a config tree.
//! Values can be scalars (string, int, float, bool, null, enum member),
//! sequences, or mappings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A plain configuration value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value (may contain interpolations like ${a.b})
    String(String),
    /// Member of a declared enum
    #[serde(skip_deserializing)]
    Enum(EnumValue),
    /// Sequence of values
    Sequence(Vec<Value>),
    /// Mapping of string keys to values
    Mapping(IndexMap<String, Value>),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if this value is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Check if this value is a float
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Check if this value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if this value is an enum member
    pub fn is_enum(&self) -> bool {
        matches!(self, Value::Enum(_))
    }

    /// Check if this value is a sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self, Value::Sequence(_))
    }

    /// Check if this value is a mapping
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Get as boolean if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float or Integer
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as enum member if this is an Enum
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Get as slice if this is a Sequence
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a Mapping
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Enum(_) => "enum",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    /// Decode a string the way command-line overrides and resolver output are decoded:
    /// `true`/`false` (any case), then an integer, then a float, otherwise the string itself.
    pub fn decode_primitive(s: &str) -> Value {
        let lower = s.to_lowercase();
        if lower == "true" || lower == "false" {
            return Value::Bool(lower == "true");
        }
        if let Ok(i) = s.trim().parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = s.trim().parse::<f64>() {
            return Value::Float(f);
        }
        Value::String(s.to_string())
    }

    /// Parse YAML text into a value
    pub fn from_yaml_str(yaml: &str) -> Result<Value> {
        let raw: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| Error::parse(e.to_string()))?;
        Value::from_yaml(&raw)
    }

    /// Parse JSON text into a value
    pub fn from_json_str(json: &str) -> Result<Value> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Error::parse(e.to_string()))?;
        Value::from_json(&raw)
    }

    /// Convert a parsed YAML document, rejecting shapes a config tree cannot hold
    pub fn from_yaml(raw: &serde_yaml::Value) -> Result<Value> {
        from_yaml_at(raw, "")
    }

    /// Convert a parsed JSON document, rejecting integers outside `i64`
    pub fn from_json(raw: &serde_json::Value) -> Result<Value> {
        from_json_at(raw, "")
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn from_yaml_at(raw: &serde_yaml::Value, path: &str) -> Result<Value> {
    Ok(match raw {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_f64() {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            } else {
                return Err(Error::unsupported_value_type(
                    path,
                    format!("integer {} does not fit in 64 bits", n),
                ));
            }
        }
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_yaml_at(item, &join_path(path, &i.to_string())))
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => {
                        return Err(Error::unsupported_key_type(format!(
                            "Key type is not str ({:?})",
                            other
                        ))
                        .with_path(path))
                    }
                };
                let child = from_yaml_at(v, &join_path(path, &key))?;
                out.insert(key, child);
            }
            Value::Mapping(out)
        }
        serde_yaml::Value::Tagged(tagged) => {
            return Err(Error::unsupported_value_type(
                path,
                format!("tagged value {} is not supported", tagged.tag),
            ))
        }
    })
}

fn from_json_at(raw: &serde_json::Value, path: &str) -> Result<Value> {
    Ok(match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if n.is_f64() {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            } else {
                return Err(Error::unsupported_value_type(
                    path,
                    format!("integer {} does not fit in 64 bits", n),
                ));
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json_at(item, &join_path(path, &i.to_string())))
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_json::Value::Object(map) => {
            let mut out = IndexMap::with_capacity(map.len());
            for (key, v) in map {
                out.insert(key.clone(), from_json_at(v, &join_path(path, key))?);
            }
            Value::Mapping(out)
        }
    })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Enum(e) => write!(f, "{}", e),
            Value::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Mapping(m)
    }
}

#[derive(Debug)]
struct EnumDef {
    name: String,
    members: Vec<(String, i64)>,
}

/// A declared enumeration: a name plus ordered `(member, integer value)` pairs
#[derive(Debug, Clone)]
pub struct EnumType(Arc<EnumDef>);

impl EnumType {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = (S, i64)>,
    ) -> Self {
        Self(Arc::new(EnumDef {
            name: name.into(),
            members: members.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Look up a member by its bare name
    pub fn member(&self, name: &str) -> Option<EnumValue> {
        self.0
            .members
            .iter()
            .position(|(n, _)| n == name)
            .map(|index| EnumValue {
                enum_type: self.clone(),
                index,
            })
    }

    /// Look up a member by its integer value
    pub fn from_value(&self, value: i64) -> Option<EnumValue> {
        self.0
            .members
            .iter()
            .position(|(_, v)| *v == value)
            .map(|index| EnumValue {
                enum_type: self.clone(),
                index,
            })
    }

    pub fn members(&self) -> impl Iterator<Item = EnumValue> + '_ {
        (0..self.0.members.len()).map(move |index| EnumValue {
            enum_type: self.clone(),
            index,
        })
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.0.members.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.name == other.0.name && self.0.members == other.0.members)
    }
}

impl fmt::Display for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

/// One member of an [`EnumType`]
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    enum_type: EnumType,
    index: usize,
}

impl EnumValue {
    pub fn enum_type(&self) -> &EnumType {
        &self.enum_type
    }

    pub fn name(&self) -> &str {
        &self.enum_type.0.members[self.index].0
    }

    pub fn value(&self) -> i64 {
        self.enum_type.0.members[self.index].1
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_type.name(), self.name())
    }
}

impl Serialize for EnumValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
