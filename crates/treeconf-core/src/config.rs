//! Top-level entry point for building config trees

use std::fmt;

use crate::container::{Container, Content, Sealed, Shared};
use crate::dictconfig::DictConfig;
use crate::error::{Error, Result};
use crate::listconfig::ListConfig;
use crate::node::{Input, Resolved};
use crate::schema::StructuredObject;
use crate::value::Value;

/// A config tree root, or any container reached from one
#[derive(Debug, Clone, PartialEq)]
pub enum Config {
    Dict(DictConfig),
    List(ListConfig),
}

impl Config {
    /// Build a tree from plain data, a container, or a structured schema.
    ///
    /// Null gives an empty mapping. Containers are deep-copied. Scalars have
    /// no container to live in and are rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use treeconf_core::{Config, Value};
    ///
    /// let cfg = Config::create(Value::from_yaml_str("port: 8080").unwrap()).unwrap();
    /// let port = cfg.as_dict().unwrap().get_i64("port").unwrap();
    /// assert_eq!(port, 8080);
    /// ```
    pub fn create(input: impl Into<Input>) -> Result<Config> {
        match input.into() {
            Input::Value(Value::Null) => Ok(Config::Dict(DictConfig::new())),
            Input::Value(Value::Mapping(map)) => Ok(Config::Dict(DictConfig::from_mapping(map)?)),
            Input::Value(Value::Sequence(values)) => {
                Ok(Config::List(ListConfig::from_values(values)?))
            }
            Input::Value(other) => Err(Error::validation(
                "",
                format!(
                    "Cannot create a config from a {} value",
                    other.type_name()
                ),
            )
            .with_help("Wrap the value in a mapping or a sequence")),
            Input::Node(node) => Err(Error::validation(
                "",
                format!("Cannot create a config from a scalar node ({})", node),
            )),
            Input::Dict(dict) => Ok(Config::Dict(dict.deep_copy())),
            Input::List(list) => Ok(Config::List(list.deep_copy())),
            Input::Structured(obj) => Ok(Config::Dict(DictConfig::from_structured(obj)?)),
        }
    }

    /// Bind a structured schema (type or instance)
    pub fn structured(obj: impl Into<StructuredObject>) -> Result<Config> {
        Ok(Config::Dict(DictConfig::from_structured(obj)?))
    }

    /// Parse YAML text; an empty document gives an empty mapping
    pub fn from_yaml(yaml: &str) -> Result<Config> {
        Self::create(Value::from_yaml_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Config> {
        Self::create(Value::from_json_str(json)?)
    }

    pub fn as_dict(&self) -> Option<&DictConfig> {
        match self {
            Config::Dict(d) => Some(d),
            Config::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListConfig> {
        match self {
            Config::List(l) => Some(l),
            Config::Dict(_) => None,
        }
    }

    pub fn into_dict(self) -> Option<DictConfig> {
        match self {
            Config::Dict(d) => Some(d),
            Config::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<ListConfig> {
        match self {
            Config::List(l) => Some(l),
            Config::Dict(_) => None,
        }
    }

    pub fn deep_copy(&self) -> Config {
        match self {
            Config::Dict(d) => Config::Dict(d.deep_copy()),
            Config::List(l) => Config::List(l.deep_copy()),
        }
    }

    pub(crate) fn from_shared(inner: Shared) -> Config {
        let is_dict = matches!(inner.borrow().content, Content::Dict { .. });
        if is_dict {
            Config::Dict(DictConfig { inner })
        } else {
            Config::List(ListConfig { inner })
        }
    }
}

impl Sealed for Config {
    fn shared(&self) -> &Shared {
        match self {
            Config::Dict(d) => &d.inner,
            Config::List(l) => &l.inner,
        }
    }
}

impl Container for Config {}

impl From<Config> for Resolved {
    fn from(config: Config) -> Self {
        match config {
            Config::Dict(d) => Resolved::Dict(d),
            Config::List(l) => Resolved::List(l),
        }
    }
}

impl From<Config> for Input {
    fn from(config: Config) -> Self {
        match config {
            Config::Dict(d) => Input::Dict(d),
            Config::List(l) => Input::List(l),
        }
    }
}

impl PartialEq<Value> for Config {
    fn eq(&self, other: &Value) -> bool {
        match self {
            Config::Dict(d) => d == other,
            Config::List(l) => l == other,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Config::Dict(d) => write!(f, "{}", d),
            Config::List(l) => write!(f, "{}", l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::{Field, StructuredType};
    use crate::ValueType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_from_plain_values() {
        assert!(Config::create(Value::Null).unwrap().as_dict().unwrap().is_empty());
        assert!(Config::create(vec![1, 2]).unwrap().as_list().is_some());

        let err = Config::create(10).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(Config::create("text").is_err());
    }

    #[test]
    fn test_create_copies_containers() {
        let source = DictConfig::from_yaml("a: 1").unwrap();
        let cfg = Config::create(&source).unwrap();
        source.set("a", 2).unwrap();
        assert_eq!(cfg.as_dict().unwrap().get_i64("a").unwrap(), 1);
    }

    #[test]
    fn test_create_from_structured() {
        let ty = StructuredType::new("S", [Field::new("n", ValueType::Int).with_default(3)]);
        let cfg = Config::create(&ty).unwrap();
        assert_eq!(cfg.as_dict().unwrap().declared_type(), Some(ty.clone()));
        assert_eq!(Config::structured(ty).unwrap().to_value(true).unwrap(), Value::Mapping(
            [("n".to_string(), Value::Integer(3))].into_iter().collect()
        ));
    }

    #[test]
    fn test_yaml_and_json_round_trip() {
        let cfg = Config::from_yaml("a: 1\nb: ${a}\nc: [x, y]\n").unwrap();
        let json = cfg.to_json(true).unwrap();
        let back = Config::from_json(&json).unwrap();
        assert_eq!(back.to_value(false).unwrap(), cfg.to_value(true).unwrap());

        let raw = cfg.to_yaml(false).unwrap();
        assert!(raw.contains("${a}"));
    }

    #[test]
    fn test_parent_and_root() {
        let cfg = Config::from_yaml("a:\n  b:\n    c: 1\n").unwrap();
        let b = cfg.select("a.b").unwrap().unwrap();
        let b = b.as_dict().unwrap();

        assert_eq!(b.full_key(), "a.b");
        assert_eq!(b.root(), cfg);
        assert_eq!(b.parent().unwrap().full_key(), "a");
        assert!(cfg.parent().is_none());
    }
}
