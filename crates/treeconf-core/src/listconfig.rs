//! Sequence containers

use std::fmt;

use crate::container::{self, full_key, Container, ContainerData, Sealed, Shared};
use crate::error::{Error, Result};
use crate::node::{Input, Node, NodeKey, Resolved};
use crate::nodes::ValueType;
use crate::value::Value;

/// An ordered, integer-indexed sequence of nodes.
///
/// Like [`DictConfig`](crate::DictConfig) this is a handle; clones share content.
/// Struct mode has no effect on sequences; read-only mode blocks every mutation.
#[derive(Clone)]
pub struct ListConfig {
    pub(crate) inner: Shared,
}

impl Sealed for ListConfig {
    fn shared(&self) -> &Shared {
        &self.inner
    }
}

impl Container for ListConfig {}

impl Default for ListConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ListConfig {
    pub fn new() -> Self {
        Self::typed(ValueType::Any)
    }

    /// Create an empty sequence whose new scalar elements get `element_type`
    pub fn typed(element_type: ValueType) -> Self {
        Self {
            inner: ContainerData::new_list(element_type),
        }
    }

    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        Self::typed_from(ValueType::Any, values)
    }

    /// Build a homogeneous sequence; every element is converted to `element_type`
    pub fn typed_from(element_type: ValueType, values: Vec<Value>) -> Result<Self> {
        let list = Self::typed(element_type);
        for value in values {
            list.append(value)?;
        }
        Ok(list)
    }

    /// Build from a sequence value; null gives an empty sequence
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Sequence(values) => Self::from_values(values),
            Value::Null => Ok(Self::new()),
            other => Err(Error::validation(
                "",
                format!("Expected a sequence, got {}", other.type_name()),
            )),
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_value(Value::from_yaml_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_value(Value::from_json_str(json)?)
    }

    fn path(&self, index: usize) -> String {
        full_key(&self.inner, Some(&NodeKey::Index(index)))
    }

    fn check_writable(&self, index: usize) -> Result<()> {
        if self.is_readonly() {
            return Err(Error::readonly(self.path(index)));
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> Error {
        Error::key_not_found(
            self.path(index),
            format!("Index {} out of range (len {})", index, self.len()),
        )
    }

    /// The node at `index`, unresolved
    pub fn get_node(&self, index: usize) -> Option<Node> {
        self.inner.borrow().list_items().get(index).cloned()
    }

    /// Read and resolve the element at `index`; `None` if out of range
    pub fn get(&self, index: usize) -> Result<Option<Resolved>> {
        let node = self.get_node(index);
        let key = NodeKey::Index(index);
        let mut stack = vec![self.path(index)];
        container::resolve_with_default(&self.inner, &key, node.as_ref(), None, &mut stack)
    }

    /// Replace the element at `index`, converting through its current node
    pub fn set(&self, index: usize, value: impl Into<Input>) -> Result<()> {
        self.check_writable(index)?;
        let existing = self
            .get_node(index)
            .ok_or_else(|| self.out_of_range(index))?;

        let path = self.path(index);
        let node = container::prepare_node(&self.inner, Some(&existing), value.into())
            .map_err(|e| e.within(&path))?;
        self.inner.borrow_mut().list_items_mut()[index] = node;
        log::trace!("Set '{}'", path);
        Ok(())
    }

    pub fn append(&self, value: impl Into<Input>) -> Result<()> {
        let index = self.len();
        self.check_writable(index)?;

        let path = self.path(index);
        let node = container::prepare_node(&self.inner, None, value.into())
            .map_err(|e| e.within(&path))?;
        self.inner.borrow_mut().list_items_mut().push(node);
        Ok(())
    }

    /// Insert before `index`; `index == len()` appends
    pub fn insert(&self, index: usize, value: impl Into<Input>) -> Result<()> {
        self.check_writable(index)?;
        if index > self.len() {
            return Err(self.out_of_range(index));
        }

        let path = self.path(index);
        let node = container::prepare_node(&self.inner, None, value.into())
            .map_err(|e| e.within(&path))?;
        self.inner.borrow_mut().list_items_mut().insert(index, node);
        Ok(())
    }

    /// Remove and return the resolved element at `index` (last if `None`).
    ///
    /// The element is resolved before removal; if that fails the sequence is unchanged.
    pub fn pop(&self, index: Option<usize>) -> Result<Resolved> {
        let len = self.len();
        let index = match index {
            Some(i) => i,
            None if len > 0 => len - 1,
            None => {
                return Err(Error::key_not_found(
                    self.full_key(),
                    "pop from empty ListConfig",
                ))
            }
        };
        self.check_writable(index)?;
        if index >= len {
            return Err(self.out_of_range(index));
        }

        let resolved = self.get(index)?.ok_or_else(|| self.out_of_range(index))?;
        let mut node = self.inner.borrow_mut().list_items_mut().remove(index);
        node.set_parent(None);
        Ok(resolved)
    }

    /// Remove every element
    pub fn clear(&self) -> Result<()> {
        if self.is_readonly() {
            return Err(Error::readonly(self.full_key()));
        }
        let removed: Vec<Node> = self.inner.borrow_mut().list_items_mut().drain(..).collect();
        for mut node in removed {
            node.set_parent(None);
        }
        Ok(())
    }

    /// Elements in order, resolved or as written
    pub fn items(&self, resolve: bool) -> Result<Vec<Resolved>> {
        let nodes = self.inner.borrow().list_items().clone();
        nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| {
                if resolve {
                    let key = NodeKey::Index(index);
                    let mut stack = vec![self.path(index)];
                    container::resolve_node(&self.inner, &key, &node, &mut stack)
                } else {
                    Ok(match node {
                        Node::Value(v) => Resolved::Value(v.value().clone()),
                        Node::Dict(d) => Resolved::Dict(d),
                        Node::List(l) => Resolved::List(l),
                    })
                }
            })
            .collect()
    }

    pub fn copy(&self) -> ListConfig {
        self.deep_copy()
    }

    /// Independent copy of this sequence and all descendants, detached from any parent
    pub fn deep_copy(&self) -> ListConfig {
        ListConfig {
            inner: container::deep_copy(&self.inner),
        }
    }

    /// Equality that reports resolution failures instead of hiding them
    pub fn try_eq(&self, other: &ListConfig) -> Result<bool> {
        container::list_eq(&self.inner, &other.inner)
    }

    /// Compare with plain data; a sequence is compared as if wrapped in a `ListConfig`
    pub fn try_eq_value(&self, other: &Value) -> Result<bool> {
        match other {
            Value::Sequence(values) => {
                let other = ListConfig::from_values(values.clone())?;
                self.try_eq(&other)
            }
            _ => Ok(false),
        }
    }
}

impl PartialEq for ListConfig {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl PartialEq<Value> for ListConfig {
    fn eq(&self, other: &Value) -> bool {
        self.try_eq_value(other).unwrap_or(false)
    }
}

impl fmt::Debug for ListConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        f.debug_struct("ListConfig")
            .field("content", data.list_items())
            .field("flags", &data.flags)
            .field("element_type", &data.element_type)
            .finish()
    }
}

impl fmt::Display for ListConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", container::raw_value(&self.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictconfig::DictConfig;
    use crate::error::ErrorKind;

    #[test]
    fn test_from_values_and_get() {
        let list = ListConfig::from_yaml("[1, two, {a: 3}, [4]]").unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(0).unwrap().unwrap(), Value::Integer(1));
        assert_eq!(list.get(1).unwrap().unwrap().as_str(), Some("two"));
        assert!(list.get(2).unwrap().unwrap().as_dict().is_some());
        assert!(list.get(3).unwrap().unwrap().as_list().is_some());
        assert!(list.get(9).unwrap().is_none());
    }

    #[test]
    fn test_typed_list_converts_elements() {
        let list = ListConfig::typed_from(
            ValueType::Int,
            vec![Value::from(1), Value::from("1000")],
        )
        .unwrap();
        assert_eq!(list.get(1).unwrap().unwrap(), Value::Integer(1000));

        let err = list.append("fail").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.path, Some("2".into()));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_set_and_insert() {
        let list = ListConfig::from_yaml("[a, b]").unwrap();
        list.set(1, "c").unwrap();
        list.insert(0, "z").unwrap();
        list.insert(3, "end").unwrap();
        assert_eq!(
            list.to_value(false).unwrap(),
            Value::from(vec!["z", "a", "c", "end"])
        );

        assert_eq!(list.set(9, "x").unwrap_err().kind, ErrorKind::KeyNotFound);
        assert_eq!(list.insert(9, "x").unwrap_err().kind, ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_pop() {
        let list = ListConfig::from_yaml("[1, 2, 3]").unwrap();
        assert_eq!(list.pop(None).unwrap(), Value::Integer(3));
        assert_eq!(list.pop(Some(0)).unwrap(), Value::Integer(1));
        assert_eq!(list.len(), 1);
        assert!(list.pop(Some(5)).is_err());

        list.clear().unwrap();
        assert!(list.is_empty());
        assert_eq!(list.pop(None).unwrap_err().kind, ErrorKind::KeyNotFound);
    }

    #[test]
    fn test_readonly_blocks_mutation() {
        let list = ListConfig::from_yaml("[1, 2]").unwrap();
        list.set_readonly(Some(true));
        assert_eq!(list.append(3).unwrap_err().kind, ErrorKind::Readonly);
        assert_eq!(list.set(0, 3).unwrap_err().kind, ErrorKind::Readonly);
        assert_eq!(list.pop(None).unwrap_err().kind, ErrorKind::Readonly);
        assert_eq!(list.clear().unwrap_err().kind, ErrorKind::Readonly);

        list.read_write(|l| l.append(3)).unwrap();
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_struct_mode_does_not_apply() {
        let list = ListConfig::new();
        list.set_struct(Some(true));
        list.append(1).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_interpolation_from_list_element() {
        let cfg = DictConfig::from_yaml("ports: [80, 443]\nmain: ${ports.1}\n").unwrap();
        assert_eq!(cfg.get("main").unwrap().unwrap(), Value::Integer(443));

        let ports = cfg.get_list("ports").unwrap();
        ports.set(0, "${main}").unwrap();
        assert_eq!(ports.get(0).unwrap().unwrap(), Value::Integer(443));
    }

    #[test]
    fn test_nested_element_paths() {
        let cfg = DictConfig::from_yaml("servers:\n  - port: 1\n").unwrap();
        let servers = cfg.get_list("servers").unwrap();
        let first = servers.get(0).unwrap().unwrap();
        let first = first.as_dict().unwrap();
        assert_eq!(first.full_key(), "servers.0");

        first.set_readonly(Some(true));
        let err = first.set("port", 2).unwrap_err();
        assert_eq!(err.path, Some("servers.0.port".into()));
    }

    #[test]
    fn test_equality_with_plain_sequence() {
        let list = ListConfig::from_yaml("[1, 2.0, x]").unwrap();
        assert_eq!(list, Value::from(vec![Value::from(1), Value::from(2), Value::from("x")]));
        assert_ne!(list, Value::from(vec![1, 2]));
        assert_eq!(list, list.deep_copy());
    }

    #[test]
    fn test_items() {
        let cfg = DictConfig::from_yaml("a: 1\nl: ['${a}', 2]\n").unwrap();
        let list = cfg.get_list("l").unwrap();
        let resolved = list.items(true).unwrap();
        assert_eq!(resolved[0], Value::Integer(1));
        let raw = list.items(false).unwrap();
        assert_eq!(raw[0], Value::from("${a}"));
    }
}
