//! Tree nodes, assignment inputs and read results

use indexmap::IndexMap;
use std::fmt;

use crate::container::{self, WeakShared};
use crate::dictconfig::DictConfig;
use crate::error::Result;
use crate::flags::Flag;
use crate::listconfig::ListConfig;
use crate::nodes::ValueNode;
use crate::schema::{StructuredObject, StructuredType};
use crate::value::{EnumValue, Value};

/// Key of a child inside its container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Str(String),
    Index(usize),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Str(s) => write!(f, "{}", s),
            NodeKey::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        NodeKey::Str(s.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        NodeKey::Str(s)
    }
}

impl From<&String> for NodeKey {
    fn from(s: &String) -> Self {
        NodeKey::Str(s.clone())
    }
}

impl From<usize> for NodeKey {
    fn from(i: usize) -> Self {
        NodeKey::Index(i)
    }
}

/// A child of a container: a scalar leaf or a nested container.
///
/// Cloning a `Node::Dict`/`Node::List` clones the handle, not the subtree.
#[derive(Debug, Clone)]
pub enum Node {
    Value(ValueNode),
    Dict(DictConfig),
    List(ListConfig),
}

impl Node {
    pub fn as_value_node(&self) -> Option<&ValueNode> {
        match self {
            Node::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictConfig> {
        match self {
            Node::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListConfig> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    /// Effective flag value for this node
    pub fn get_flag(&self, flag: Flag) -> bool {
        match self {
            Node::Value(v) => v.get_flag(flag),
            Node::Dict(d) => container::get_flag(&d.inner, flag),
            Node::List(l) => container::get_flag(&l.inner, flag),
        }
    }

    /// Independent copy of this node and everything below it
    pub fn deep_copy(&self) -> Node {
        match self {
            Node::Value(v) => {
                let mut copy = v.clone();
                copy.parent = None;
                Node::Value(copy)
            }
            Node::Dict(d) => Node::Dict(d.deep_copy()),
            Node::List(l) => Node::List(l.deep_copy()),
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<WeakShared>) {
        match self {
            Node::Value(v) => v.parent = parent,
            Node::Dict(d) => d.inner.borrow_mut().parent = parent,
            Node::List(l) => l.inner.borrow_mut().parent = parent,
        }
    }

    /// Raw content, interpolations left as written
    pub fn raw_value(&self) -> Value {
        match self {
            Node::Value(v) => v.value().clone(),
            Node::Dict(d) => container::raw_value(&d.inner),
            Node::List(l) => container::raw_value(&l.inner),
        }
    }
}

/// Anything that can be assigned into a container
#[derive(Debug, Clone)]
pub enum Input {
    /// Plain data; mappings and sequences become nested containers
    Value(Value),
    /// A prepared scalar node, stored as is
    Node(ValueNode),
    /// A mapping container; deep-copied on assignment
    Dict(DictConfig),
    /// A sequence container; deep-copied on assignment
    List(ListConfig),
    /// An instance of a structured schema
    Structured(StructuredObject),
}

impl Input {
    pub(crate) fn type_name(&self) -> String {
        match self {
            Input::Value(v) => v.type_name().to_string(),
            Input::Node(_) => "ValueNode".to_string(),
            Input::Dict(d) => d
                .declared_type()
                .map(|t| t.name().to_string())
                .unwrap_or_else(|| "DictConfig".to_string()),
            Input::List(_) => "ListConfig".to_string(),
            Input::Structured(obj) => obj.structured_type().name().to_string(),
        }
    }
}

macro_rules! input_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Input {
                fn from(v: $ty) -> Self {
                    Input::Value(Value::from(v))
                }
            }
        )*
    };
}

input_from_value!(
    bool,
    i32,
    i64,
    f64,
    &str,
    String,
    EnumValue,
    IndexMap<String, Value>,
);

impl From<Value> for Input {
    fn from(v: Value) -> Self {
        Input::Value(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Input {
    fn from(v: Vec<T>) -> Self {
        Input::Value(Value::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Input {
    fn from(v: Option<T>) -> Self {
        Input::Value(Value::from(v))
    }
}

impl From<ValueNode> for Input {
    fn from(v: ValueNode) -> Self {
        Input::Node(v)
    }
}

impl From<DictConfig> for Input {
    fn from(d: DictConfig) -> Self {
        Input::Dict(d)
    }
}

impl From<&DictConfig> for Input {
    fn from(d: &DictConfig) -> Self {
        Input::Dict(d.clone())
    }
}

impl From<ListConfig> for Input {
    fn from(l: ListConfig) -> Self {
        Input::List(l)
    }
}

impl From<&ListConfig> for Input {
    fn from(l: &ListConfig) -> Self {
        Input::List(l.clone())
    }
}

impl From<StructuredObject> for Input {
    fn from(obj: StructuredObject) -> Self {
        Input::Structured(obj)
    }
}

impl From<StructuredType> for Input {
    fn from(ty: StructuredType) -> Self {
        Input::Structured(ty.instance())
    }
}

impl From<&StructuredType> for Input {
    fn from(ty: &StructuredType) -> Self {
        Input::Structured(ty.instance())
    }
}

/// The result of reading a key: a resolved scalar or a live container handle
#[derive(Debug, Clone)]
pub enum Resolved {
    Value(Value),
    Dict(DictConfig),
    List(ListConfig),
}

impl Resolved {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictConfig> {
        match self {
            Resolved::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListConfig> {
        match self {
            Resolved::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        self.as_value().and_then(Value::as_enum)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Value(Value::Null))
    }

    /// Plain value, with containers converted and their interpolations resolved
    pub fn to_value(&self) -> Result<Value> {
        match self {
            Resolved::Value(v) => Ok(v.clone()),
            Resolved::Dict(d) => container::to_value(&d.inner, true),
            Resolved::List(l) => container::to_value(&l.inner, true),
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Resolved::Value(v) => v.type_name(),
            Resolved::Dict(_) => "DictConfig",
            Resolved::List(_) => "ListConfig",
        }
    }

    pub(crate) fn try_eq(&self, other: &Resolved) -> Result<bool> {
        container::resolved_eq(self, other)
    }
}

impl PartialEq for Resolved {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl PartialEq<Value> for Resolved {
    fn eq(&self, other: &Value) -> bool {
        self.try_eq(&Resolved::Value(other.clone()))
            .unwrap_or(false)
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Value(v) => write!(f, "{}", v),
            Resolved::Dict(d) => write!(f, "{}", d),
            Resolved::List(l) => write!(f, "{}", l),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_key_display() {
        assert_eq!(NodeKey::from("a").to_string(), "a");
        assert_eq!(NodeKey::from(3usize).to_string(), "3");
    }

    #[test]
    fn test_input_from_plain_values() {
        assert!(matches!(Input::from(5), Input::Value(Value::Integer(5))));
        assert!(matches!(
            Input::from(vec![1, 2]),
            Input::Value(Value::Sequence(_))
        ));
        assert!(matches!(Input::from(None::<i64>), Input::Value(Value::Null)));
        assert!(matches!(
            Input::from(ValueNode::integer(1).unwrap()),
            Input::Node(_)
        ));
    }

    #[test]
    fn test_resolved_accessors() {
        let r = Resolved::Value(Value::Integer(4));
        assert_eq!(r.as_i64(), Some(4));
        assert_eq!(r.as_f64(), Some(4.0));
        assert_eq!(r.as_str(), None);
        assert!(!r.is_null());
        assert_eq!(r, Value::Integer(4));
        assert_eq!(r, Value::Float(4.0));
    }

    #[test]
    fn test_resolved_dict_compares_with_mapping() {
        let dict = DictConfig::from_yaml("a: 1\nb: ${a}\n").unwrap();
        let mut expected = IndexMap::new();
        expected.insert("a".to_string(), Value::Integer(1));
        expected.insert("b".to_string(), Value::Integer(1));

        assert_eq!(Resolved::Dict(dict), Value::Mapping(expected));
    }

    #[test]
    fn test_deep_copy_detaches_value_node() {
        let dict = DictConfig::from_yaml("a: 1\n").unwrap();
        let node = dict.get_node("a").unwrap().unwrap();
        let copy = node.deep_copy();
        assert!(copy.as_value_node().unwrap().parent().is_none());
        assert!(node.as_value_node().unwrap().parent().is_some());
    }
}
