//! Mapping containers

use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

use crate::container::{self, full_key, Container, ContainerData, Sealed, Shared};
use crate::error::{Error, ErrorKind, Result};
use crate::flags::Flag;
use crate::listconfig::ListConfig;
use crate::node::{Input, Node, NodeKey, Resolved};
use crate::nodes::ValueType;
use crate::schema::{self, StructuredObject, StructuredType};
use crate::value::{EnumValue, Value};

/// A mapping from string keys to nodes.
///
/// `DictConfig` is a handle: cloning it yields another handle to the same
/// mapping. Use [`DictConfig::deep_copy`] for an independent copy.
#[derive(Clone)]
pub struct DictConfig {
    pub(crate) inner: Shared,
}

impl Sealed for DictConfig {
    fn shared(&self) -> &Shared {
        &self.inner
    }
}

impl Container for DictConfig {}

impl Default for DictConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DictConfig {
    /// Create an empty, untyped mapping
    pub fn new() -> Self {
        Self::typed(ValueType::Any)
    }

    /// Create an empty mapping whose new scalar children get `element_type`
    pub fn typed(element_type: ValueType) -> Self {
        Self {
            inner: ContainerData::new_dict(element_type),
        }
    }

    /// Build from plain data; nested mappings and sequences become containers
    pub fn from_mapping(map: IndexMap<String, Value>) -> Result<Self> {
        Self::typed_from(ValueType::Any, map)
    }

    pub fn typed_from(element_type: ValueType, map: IndexMap<String, Value>) -> Result<Self> {
        let dict = Self::typed(element_type);
        for (key, value) in map {
            dict.set(key, value)?;
        }
        Ok(dict)
    }

    /// Build from a mapping value; null gives an empty mapping
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Mapping(map) => Self::from_mapping(map),
            Value::Null => Ok(Self::new()),
            other => Err(Error::validation(
                "",
                format!("Expected a mapping, got {}", other.type_name()),
            )),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_value(Value::from_yaml_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(Value::from_json_str(json)?)
    }

    /// Build a typed mapping from a structured schema instance.
    ///
    /// The result rejects unknown keys, only accepts the same schema type
    /// for nested structured fields, and is read-only if the schema is frozen.
    pub fn from_structured(obj: impl Into<StructuredObject>) -> Result<Self> {
        let obj = obj.into();
        let ty = obj.structured_type().clone();
        let dict = Self::new();

        let fields = schema::structured_fields(&obj)?;
        {
            let weak = Rc::downgrade(&dict.inner);
            let mut data = dict.inner.borrow_mut();
            for (name, mut node) in fields {
                node.set_parent(Some(weak.clone()));
                data.dict_items_mut().insert(name, node);
            }
        }

        if ty.is_frozen() {
            dict.set_readonly(Some(true));
        }
        dict.inner.borrow_mut().set_declared_type(Some(ty));
        Ok(dict)
    }

    /// Schema this mapping was built from, if any
    pub fn declared_type(&self) -> Option<StructuredType> {
        self.inner.borrow().declared_type().cloned()
    }

    /// Assign `value` under `key`.
    ///
    /// Scalars assigned over an existing scalar node are converted by that
    /// node's type; mappings and sequences become nested containers; given
    /// containers are deep-copied.
    pub fn set(&self, key: impl Into<NodeKey>, value: impl Into<Input>) -> Result<()> {
        let key = match key.into() {
            NodeKey::Str(key) => key,
            NodeKey::Index(index) => {
                return Err(Error::unsupported_key_type(format!(
                    "Key type is not str (int {})",
                    index
                ))
                .with_path(self.full_key()))
            }
        };
        let input = value.into();
        let node_key = NodeKey::Str(key.clone());
        let path = full_key(&self.inner, Some(&node_key));

        if self.is_readonly() {
            return Err(Error::readonly(path));
        }

        let existing = self.inner.borrow().dict_items().get(&key).cloned();
        self.validate_access(existing.is_some(), &path)?;
        validate_type(existing.as_ref(), &input, &path)?;

        let node = container::prepare_node(&self.inner, existing.as_ref(), input)
            .map_err(|e| e.within(&path))?;
        self.inner.borrow_mut().dict_items_mut().insert(key, node);
        log::trace!("Set '{}'", path);
        Ok(())
    }

    /// Read and resolve `key`. `None` if the key is absent.
    pub fn get(&self, key: &str) -> Result<Option<Resolved>> {
        self.get_impl(key, None)
    }

    /// Read and resolve `key`, falling back to `default` when the key is
    /// absent (or unknown under struct mode), null, or `???`
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Result<Resolved> {
        Ok(self
            .get_impl(key, Some(default.into()))?
            .unwrap_or(Resolved::Value(Value::Null)))
    }

    fn get_impl(&self, key: &str, default: Option<Value>) -> Result<Option<Resolved>> {
        let node = match self.get_node(key) {
            Ok(node) => node,
            Err(e) if e.is(&ErrorKind::KeyNotFound) && default.is_some() => None,
            Err(e) => return Err(e),
        };
        let node_key = NodeKey::Str(key.to_string());
        let mut stack = vec![full_key(&self.inner, Some(&node_key))];
        container::resolve_with_default(&self.inner, &node_key, node.as_ref(), default, &mut stack)
    }

    /// The node stored under `key`, unresolved
    pub fn get_node(&self, key: &str) -> Result<Option<Node>> {
        let node = self.inner.borrow().dict_items().get(key).cloned();
        let path = full_key(&self.inner, Some(&NodeKey::Str(key.to_string())));
        self.validate_access(node.is_some(), &path)?;
        Ok(node)
    }

    /// Like [`get_node`](Self::get_node), but a key rejected under struct
    /// mode yields `default`. An absent key of an open mapping is still `None`.
    pub fn get_node_or(&self, key: &str, default: Node) -> Result<Option<Node>> {
        match self.get_node(key) {
            Err(e) if e.is(&ErrorKind::KeyNotFound) => Ok(Some(default)),
            other => other,
        }
    }

    /// True if `key` holds a value that is not `???` and whose references resolve.
    ///
    /// A value with an unknown resolver prefix still counts as present.
    pub fn contains_key(&self, key: &str) -> bool {
        let node = match self.get_node(key) {
            Ok(Some(node)) => node,
            _ => return false,
        };
        let node_key = NodeKey::Str(key.to_string());
        let mut stack = vec![full_key(&self.inner, Some(&node_key))];
        match container::resolve_node(&self.inner, &node_key, &node, &mut stack) {
            Ok(_) => true,
            Err(e) => e.is(&ErrorKind::UnsupportedInterpolationType),
        }
    }

    /// Remove `key` and return its node, detached from this mapping
    pub fn pop(&self, key: &str) -> Result<Node> {
        let path = full_key(&self.inner, Some(&NodeKey::Str(key.to_string())));
        if self.is_readonly() {
            return Err(Error::readonly(path));
        }
        let removed = self.inner.borrow_mut().dict_items_mut().shift_remove(key);
        match removed {
            Some(mut node) => {
                node.set_parent(None);
                Ok(node)
            }
            None => Err(Error::key_not_found(path, format!("Key '{}' not found", key))),
        }
    }

    /// Like [`pop`](Self::pop), but an absent key yields a detached node holding `default`
    pub fn pop_or(&self, key: &str, default: impl Into<Value>) -> Result<Node> {
        match self.pop(key) {
            Err(e) if e.is(&ErrorKind::KeyNotFound) => {
                let node = crate::nodes::ValueNode::untyped(default)?;
                Ok(Node::Value(node))
            }
            other => other,
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().dict_items().keys().cloned().collect()
    }

    /// Key/value pairs in insertion order.
    ///
    /// With `resolve`, scalar values are resolved (an unresolvable value is an
    /// error); otherwise they are returned as written.
    pub fn items(&self, resolve: bool) -> Result<Vec<(String, Resolved)>> {
        let entries: Vec<(String, Node)> = self
            .inner
            .borrow()
            .dict_items()
            .iter()
            .map(|(k, n)| (k.clone(), n.clone()))
            .collect();

        entries
            .into_iter()
            .map(|(key, node)| {
                let value = if resolve {
                    let node_key = NodeKey::Str(key.clone());
                    let mut stack = vec![full_key(&self.inner, Some(&node_key))];
                    container::resolve_node(&self.inner, &node_key, &node, &mut stack)?
                } else {
                    match node {
                        Node::Value(v) => Resolved::Value(v.value().clone()),
                        Node::Dict(d) => Resolved::Dict(d),
                        Node::List(l) => Resolved::List(l),
                    }
                };
                Ok((key, value))
            })
            .collect()
    }

    /// Copy of this mapping; every container owns its children, so this is
    /// the same as [`deep_copy`](Self::deep_copy)
    pub fn copy(&self) -> DictConfig {
        self.deep_copy()
    }

    /// Independent copy of this mapping and all descendants, detached from any parent
    pub fn deep_copy(&self) -> DictConfig {
        DictConfig {
            inner: container::deep_copy(&self.inner),
        }
    }

    fn resolved_at(&self, path: &str) -> Result<Resolved> {
        self.select(path)?.ok_or_else(|| {
            Error::key_not_found(
                self.child_path(path),
                format!("Key '{}' not found", path),
            )
        })
    }

    fn child_path(&self, path: &str) -> String {
        let own = self.full_key();
        if own.is_empty() {
            path.to_string()
        } else {
            format!("{}.{}", own, path)
        }
    }

    /// Resolved string at a dotted path; scalars are converted to text
    pub fn get_str(&self, path: &str) -> Result<String> {
        match self.resolved_at(path)? {
            Resolved::Value(Value::String(s)) => Ok(s),
            Resolved::Value(v @ (Value::Integer(_) | Value::Float(_) | Value::Bool(_))) => {
                Ok(v.to_string())
            }
            Resolved::Value(Value::Enum(e)) => Ok(e.name().to_string()),
            other => Err(Error::type_coercion(
                self.child_path(path),
                "string",
                other.type_name(),
            )),
        }
    }

    /// Resolved integer at a dotted path; numeric strings are parsed
    pub fn get_i64(&self, path: &str) -> Result<i64> {
        match self.resolved_at(path)? {
            Resolved::Value(Value::Integer(i)) => Ok(i),
            Resolved::Value(Value::String(s)) => s.trim().parse().map_err(|_| {
                Error::type_coercion(
                    self.child_path(path),
                    "integer",
                    format!("string (\"{}\")", s),
                )
            }),
            other => Err(Error::type_coercion(
                self.child_path(path),
                "integer",
                other.type_name(),
            )),
        }
    }

    /// Resolved float at a dotted path; integers widen, numeric strings are parsed
    pub fn get_f64(&self, path: &str) -> Result<f64> {
        match self.resolved_at(path)? {
            Resolved::Value(Value::Float(f)) => Ok(f),
            Resolved::Value(Value::Integer(i)) => Ok(i as f64),
            Resolved::Value(Value::String(s)) => s.trim().parse().map_err(|_| {
                Error::type_coercion(
                    self.child_path(path),
                    "float",
                    format!("string (\"{}\")", s),
                )
            }),
            other => Err(Error::type_coercion(
                self.child_path(path),
                "float",
                other.type_name(),
            )),
        }
    }

    /// Resolved boolean at a dotted path; only "true"/"false" strings coerce
    pub fn get_bool(&self, path: &str) -> Result<bool> {
        match self.resolved_at(path)? {
            Resolved::Value(Value::Bool(b)) => Ok(b),
            Resolved::Value(Value::String(s)) => match s.to_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(Error::type_coercion(
                    self.child_path(path),
                    "boolean",
                    format!("string (\"{}\") - only \"true\" or \"false\" allowed", s),
                )),
            },
            other => Err(Error::type_coercion(
                self.child_path(path),
                "boolean",
                other.type_name(),
            )),
        }
    }

    pub fn get_enum(&self, path: &str) -> Result<EnumValue> {
        match self.resolved_at(path)? {
            Resolved::Value(Value::Enum(e)) => Ok(e),
            other => Err(Error::type_coercion(
                self.child_path(path),
                "enum",
                other.type_name(),
            )),
        }
    }

    pub fn get_dict(&self, path: &str) -> Result<DictConfig> {
        match self.resolved_at(path)? {
            Resolved::Dict(d) => Ok(d),
            other => Err(Error::type_coercion(
                self.child_path(path),
                "mapping",
                other.type_name(),
            )),
        }
    }

    pub fn get_list(&self, path: &str) -> Result<ListConfig> {
        match self.resolved_at(path)? {
            Resolved::List(l) => Ok(l),
            other => Err(Error::type_coercion(
                self.child_path(path),
                "sequence",
                other.type_name(),
            )),
        }
    }

    /// Unknown keys are rejected on typed mappings (unless this node's struct
    /// flag is explicitly off) and under struct mode
    fn validate_access(&self, exists: bool, path: &str) -> Result<()> {
        if exists {
            return Ok(());
        }
        let is_typed = self.inner.borrow().declared_type().is_some();
        let node_open = self.get_node_flag(Flag::Struct) == Some(false);
        if is_typed && node_open {
            return Ok(());
        }
        if is_typed || self.is_struct() {
            return Err(Error::key_not_found(
                path,
                format!("Accessing unknown key in a struct : {}", path),
            )
            .with_help(format!(
                "Known keys are: {}",
                self.keys().join(", ")
            )));
        }
        Ok(())
    }

    /// Equality that reports resolution failures instead of hiding them
    pub fn try_eq(&self, other: &DictConfig) -> Result<bool> {
        container::dict_eq(&self.inner, &other.inner)
    }

    /// Compare with plain data; a mapping is compared as if wrapped in a `DictConfig`
    pub fn try_eq_value(&self, other: &Value) -> Result<bool> {
        match other {
            Value::Mapping(map) => {
                let other = DictConfig::from_mapping(map.clone())?;
                self.try_eq(&other)
            }
            _ => Ok(false),
        }
    }
}

/// A structured child only accepts a value of exactly its declared type
fn validate_type(existing: Option<&Node>, input: &Input, path: &str) -> Result<()> {
    let Some(Node::Dict(child)) = existing else {
        return Ok(());
    };
    let Some(expected) = child.declared_type() else {
        return Ok(());
    };

    let matches = match input {
        Input::Structured(obj) => obj.structured_type() == &expected,
        Input::Dict(dict) => dict.declared_type().as_ref() == Some(&expected),
        _ => false,
    };
    if matches {
        Ok(())
    } else {
        Err(Error::validation(
            path,
            format!(
                "Invalid type assigned : {} != {}",
                expected.name(),
                input.type_name()
            ),
        ))
    }
}

impl PartialEq for DictConfig {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl PartialEq<Value> for DictConfig {
    fn eq(&self, other: &Value) -> bool {
        self.try_eq_value(other).unwrap_or(false)
    }
}

impl fmt::Debug for DictConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("DictConfig")
            .field("content", &data.dict_items())
            .field("flags", &data.flags)
            .field("declared_type", &data.declared_type().map(|t| t.name()))
            .finish()
    }
}

impl fmt::Display for DictConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", container::raw_value(&self.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::ValueNode;

    fn sample() -> DictConfig {
        DictConfig::from_yaml(
            r#"
server:
  host: localhost
  port: 8080
url: "http://${server.host}:${server.port}"
port_copy: ${server.port}
missing: ???
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_get_resolves_interpolations() {
        let cfg = sample();
        assert_eq!(cfg.get("port_copy").unwrap().unwrap(), Value::Integer(8080));
        assert_eq!(
            cfg.get("url").unwrap().unwrap().as_str(),
            Some("http://localhost:8080")
        );
        assert!(cfg.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_get_missing_mandatory() {
        let cfg = sample();
        let err = cfg.get("missing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingMandatoryValue);
        assert_eq!(err.path, Some("missing".into()));
    }

    #[test]
    fn test_get_or_default() {
        let cfg = sample();
        assert_eq!(cfg.get_or("missing", 5).unwrap(), Value::Integer(5));
        assert_eq!(cfg.get_or("absent", "x").unwrap(), Value::from("x"));
        assert_eq!(cfg.get_or("port_copy", 1).unwrap(), Value::Integer(8080));
    }

    #[test]
    fn test_contains_key() {
        let cfg = sample();
        cfg.set("none", Value::Null).unwrap();
        cfg.set("bad_ref", "${does.not.exist}").unwrap();
        cfg.set("custom", "${nosuchresolver:x}").unwrap();

        assert!(cfg.contains_key("server"));
        assert!(cfg.contains_key("port_copy"));
        assert!(cfg.contains_key("none"));
        assert!(cfg.contains_key("custom"));
        assert!(!cfg.contains_key("missing"));
        assert!(!cfg.contains_key("bad_ref"));
        assert!(!cfg.contains_key("absent"));
    }

    #[test]
    fn test_set_converts_through_existing_node() {
        let cfg = DictConfig::new();
        cfg.set("port", ValueNode::integer(1).unwrap()).unwrap();
        cfg.set("port", "42").unwrap();
        assert_eq!(cfg.get("port").unwrap().unwrap(), Value::Integer(42));

        let err = cfg.set("port", "abc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.path, Some("port".into()));
        assert_eq!(cfg.get("port").unwrap().unwrap(), Value::Integer(42));
    }

    #[test]
    fn test_set_rejects_integer_key() {
        let cfg = DictConfig::new();
        let err = cfg.set(0usize, 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedKeyType);
    }

    #[test]
    fn test_nested_error_paths() {
        let cfg = DictConfig::new();
        cfg.set("a", DictConfig::new()).unwrap();
        let inner = cfg.get_dict("a").unwrap();
        inner.set("b", ValueNode::integer(1).unwrap()).unwrap();

        let err = inner.set("b", "x").unwrap_err();
        assert_eq!(err.path, Some("a.b".into()));
        assert_eq!(inner.full_key(), "a");
    }

    #[test]
    fn test_readonly() {
        let cfg = sample();
        cfg.set_readonly(Some(true));

        let err = cfg.set("x", 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Readonly);

        let server = cfg.get_dict("server").unwrap();
        let err = server.set("port", 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Readonly);
        assert_eq!(err.path, Some("server.port".into()));

        assert!(cfg.pop("url").is_err());

        cfg.read_write(|c| c.set("x", 1)).unwrap();
        assert_eq!(cfg.get("x").unwrap().unwrap(), Value::Integer(1));
        assert!(cfg.is_readonly());
    }

    #[test]
    fn test_child_override_beats_parent() {
        let cfg = sample();
        cfg.set_readonly(Some(true));
        let server = cfg.get_dict("server").unwrap();
        server.set_readonly(Some(false));
        server.set("port", 1).unwrap();
        assert!(cfg.set("url", "x").is_err());
    }

    #[test]
    fn test_struct_mode() {
        let cfg = sample();
        cfg.set_struct(Some(true));

        let err = cfg.set("new_key", 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound);
        assert!(err.to_string().contains("Accessing unknown key in a struct : new_key"));

        assert!(cfg.get("new_key").is_err());
        assert_eq!(cfg.get_or("new_key", 3).unwrap(), Value::Integer(3));

        cfg.set("port_copy", 1).unwrap();
        cfg.open_dict(|c| c.set("new_key", 1)).unwrap();
        assert!(cfg.contains_key("new_key"));
        assert!(cfg.is_struct());
    }

    #[test]
    fn test_get_node_or_only_covers_struct_rejections() {
        let cfg = sample();
        let fallback = Node::Value(ValueNode::untyped(7).unwrap());

        let node = cfg.get_node_or("absent", fallback.clone()).unwrap();
        assert!(node.is_none());

        cfg.set_struct(Some(true));
        let node = cfg.get_node_or("absent", fallback.clone()).unwrap().unwrap();
        assert_eq!(node.raw_value(), Value::Integer(7));

        let node = cfg.get_node_or("port_copy", fallback).unwrap().unwrap();
        assert_eq!(node.raw_value(), Value::from("${server.port}"));
    }

    #[test]
    fn test_pop_detaches_node() {
        let cfg = sample();
        let node = cfg.pop("server").unwrap();
        let server = node.as_dict().unwrap();
        assert!(server.parent().is_none());
        assert_eq!(server.get("port").unwrap().unwrap(), Value::Integer(8080));
        assert!(!cfg.keys().contains(&"server".to_string()));

        let err = cfg.pop("server").unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound);

        let node = cfg.pop_or("server", 1).unwrap();
        assert_eq!(node.raw_value(), Value::Integer(1));
    }

    #[test]
    fn test_assigning_container_copies_it() {
        let source = DictConfig::from_yaml("x: 1").unwrap();
        let cfg = DictConfig::new();
        cfg.set("a", &source).unwrap();
        source.set("x", 2).unwrap();

        assert_eq!(cfg.get_i64("a.x").unwrap(), 1);
        assert_eq!(cfg.get_dict("a").unwrap().parent().unwrap().as_dict().unwrap(), &cfg);
    }

    #[test]
    fn test_items() {
        let cfg = DictConfig::from_yaml("a: 1\nb: ${a}\n").unwrap();
        let resolved = cfg.items(true).unwrap();
        assert_eq!(resolved[1].1, Value::Integer(1));

        let raw = cfg.items(false).unwrap();
        assert_eq!(raw[1].1, Value::from("${a}"));
    }

    #[test]
    fn test_typed_getters() {
        let cfg = DictConfig::from_yaml("n: '12'\nf: 1\nb: 'true'\nbad: 'maybe'\n").unwrap();
        assert_eq!(cfg.get_i64("n").unwrap(), 12);
        assert_eq!(cfg.get_f64("f").unwrap(), 1.0);
        assert!(cfg.get_bool("b").unwrap());
        assert_eq!(cfg.get_str("f").unwrap(), "1");

        let err = cfg.get_bool("bad").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeCoercion);
        let err = cfg.get_i64("absent").unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_equality() {
        let a = DictConfig::from_yaml("x: 1\ny: ${x}\n").unwrap();
        let b = DictConfig::from_yaml("y: 1\nx: 1\n").unwrap();
        assert_eq!(a, b);

        let c = DictConfig::from_yaml("x: 1\ny: 2\n").unwrap();
        assert_ne!(a, c);

        let m1 = DictConfig::from_yaml("x: ???").unwrap();
        let m2 = DictConfig::from_yaml("x: ???").unwrap();
        assert_eq!(m1, m2);
    }

    #[test]
    fn test_select() {
        let cfg = DictConfig::from_yaml("a:\n  b: [10, 20]\nm: ???\n").unwrap();
        assert_eq!(cfg.select("a.b.1").unwrap().unwrap(), Value::Integer(20));
        assert!(cfg.select("a.b.5").unwrap().is_none());
        assert!(cfg.select("a.x").unwrap().is_none());
        assert!(cfg.select("m").unwrap().is_none());
        assert!(cfg.select("a.b.x").is_err());
    }

    #[test]
    fn test_display_shows_raw_content() {
        let cfg = DictConfig::from_yaml("a: ${b}\nb: 1\n").unwrap();
        let shown = cfg.to_string();
        assert!(shown.contains("${b}"));
    }
}
