//! Shared container machinery
//!
//! Dict and list configs are handles to a reference-counted [`ContainerData`].
//! Each container exclusively owns its children; children point back to their
//! parent through a weak link, which is what flag lookup and interpolation
//! (always resolved from the root) walk.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::config::Config;
use crate::dictconfig::DictConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::flags::{Flag, Flags};
use crate::interpolation::{split_args, value_kind_of, InterpolationRef, ValueKind};
use crate::listconfig::ListConfig;
use crate::node::{Input, Node, NodeKey, Resolved};
use crate::nodes::{values_equal, ValueNode, ValueType};
use crate::resolver::{global_registry, Resolver, ResolverRegistry};
use crate::schema::StructuredType;
use crate::value::Value;

pub(crate) type Shared = Rc<RefCell<ContainerData>>;
pub(crate) type WeakShared = Weak<RefCell<ContainerData>>;

/// State behind a [`DictConfig`] or [`ListConfig`] handle
#[doc(hidden)]
#[derive(Debug)]
pub struct ContainerData {
    pub(crate) flags: Flags,
    pub(crate) parent: Option<WeakShared>,
    pub(crate) element_type: ValueType,
    /// Resolvers registered on this tree; only consulted on the root
    pub(crate) resolvers: Option<ResolverRegistry>,
    pub(crate) content: Content,
}

#[derive(Debug)]
pub(crate) enum Content {
    Dict {
        items: IndexMap<String, Node>,
        declared_type: Option<StructuredType>,
    },
    List(Vec<Node>),
}

impl ContainerData {
    pub(crate) fn new_dict(element_type: ValueType) -> Shared {
        Self::shared(
            element_type,
            Content::Dict {
                items: IndexMap::new(),
                declared_type: None,
            },
        )
    }

    pub(crate) fn new_list(element_type: ValueType) -> Shared {
        Self::shared(element_type, Content::List(Vec::new()))
    }

    fn shared(element_type: ValueType, content: Content) -> Shared {
        Rc::new(RefCell::new(ContainerData {
            flags: Flags::default(),
            parent: None,
            element_type,
            resolvers: None,
            content,
        }))
    }

    pub(crate) fn dict_items(&self) -> &IndexMap<String, Node> {
        match &self.content {
            Content::Dict { items, .. } => items,
            Content::List(_) => unreachable!("dict handle over list content"),
        }
    }

    pub(crate) fn dict_items_mut(&mut self) -> &mut IndexMap<String, Node> {
        match &mut self.content {
            Content::Dict { items, .. } => items,
            Content::List(_) => unreachable!("dict handle over list content"),
        }
    }

    pub(crate) fn list_items(&self) -> &Vec<Node> {
        match &self.content {
            Content::List(items) => items,
            Content::Dict { .. } => unreachable!("list handle over dict content"),
        }
    }

    pub(crate) fn list_items_mut(&mut self) -> &mut Vec<Node> {
        match &mut self.content {
            Content::List(items) => items,
            Content::Dict { .. } => unreachable!("list handle over dict content"),
        }
    }

    pub(crate) fn declared_type(&self) -> Option<&StructuredType> {
        match &self.content {
            Content::Dict { declared_type, .. } => declared_type.as_ref(),
            Content::List(_) => None,
        }
    }

    pub(crate) fn set_declared_type(&mut self, ty: Option<StructuredType>) {
        if let Content::Dict { declared_type, .. } = &mut self.content {
            *declared_type = ty;
        }
    }

    fn len(&self) -> usize {
        match &self.content {
            Content::Dict { items, .. } => items.len(),
            Content::List(items) => items.len(),
        }
    }

    fn parent(&self) -> Option<Shared> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }
}

/// Effective flag: the nearest explicit override walking up from `data`, else false
pub(crate) fn get_flag(data: &Shared, flag: Flag) -> bool {
    let mut current = data.clone();
    loop {
        let next = {
            let d = current.borrow();
            if let Some(value) = d.flags.get(flag) {
                return value;
            }
            d.parent()
        };
        match next {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

pub(crate) fn root_of(data: &Shared) -> Shared {
    let mut current = data.clone();
    loop {
        let parent = current.borrow().parent();
        match parent {
            Some(p) => current = p,
            None => return current,
        }
    }
}

fn key_in_parent(parent: &ContainerData, child: &Shared) -> Option<NodeKey> {
    let is_child = |node: &Node| match node {
        Node::Dict(d) => Rc::ptr_eq(&d.inner, child),
        Node::List(l) => Rc::ptr_eq(&l.inner, child),
        Node::Value(_) => false,
    };
    match &parent.content {
        Content::Dict { items, .. } => items
            .iter()
            .find(|(_, node)| is_child(node))
            .map(|(k, _)| NodeKey::Str(k.clone())),
        Content::List(items) => items.iter().position(is_child).map(NodeKey::Index),
    }
}

/// Dotted path from the root to `data`, extended with `key` if given
pub(crate) fn full_key(data: &Shared, key: Option<&NodeKey>) -> String {
    let mut segments: Vec<String> = key.map(|k| vec![k.to_string()]).unwrap_or_default();
    let mut current = data.clone();
    loop {
        let parent = current.borrow().parent();
        let Some(parent) = parent else { break };
        if let Some(k) = key_in_parent(&parent.borrow(), &current) {
            segments.push(k.to_string());
        }
        current = parent;
    }
    segments.reverse();
    segments.join(".")
}

/// Build the node to store for `input`, given the node currently at that slot.
///
/// Nothing is attached to `parent` here beyond the returned node's back-link;
/// the caller commits it.
pub(crate) fn prepare_node(parent: &Shared, existing: Option<&Node>, input: Input) -> Result<Node> {
    let element_type = parent.borrow().element_type.clone();

    let mut node = match input {
        Input::Value(Value::Mapping(map)) => {
            reject_typed_target(existing, "mapping")?;
            Node::Dict(DictConfig::from_mapping(map)?)
        }
        Input::Value(Value::Sequence(items)) => {
            reject_typed_target(existing, "sequence")?;
            Node::List(ListConfig::from_values(items)?)
        }
        Input::Value(scalar) => match existing {
            Some(Node::Value(current)) => {
                let mut node = current.clone();
                node.set_value(scalar)?;
                Node::Value(node)
            }
            _ => Node::Value(ValueNode::new(element_type, true, scalar)?),
        },
        Input::Node(node) => Node::Value(node),
        Input::Dict(dict) => {
            reject_typed_target(existing, "DictConfig")?;
            Node::Dict(dict.deep_copy())
        }
        Input::List(list) => {
            reject_typed_target(existing, "ListConfig")?;
            Node::List(list.deep_copy())
        }
        Input::Structured(obj) => {
            reject_typed_target(existing, obj.structured_type().name())?;
            Node::Dict(DictConfig::from_structured(obj)?)
        }
    };

    node.set_parent(Some(Rc::downgrade(parent)));
    Ok(node)
}

fn reject_typed_target(existing: Option<&Node>, incoming: &str) -> Result<()> {
    match existing {
        Some(Node::Value(current)) if current.value_type() != &ValueType::Any => {
            Err(Error::validation(
                "",
                format!(
                    "Cannot assign {} to a {} node",
                    incoming,
                    current.value_type()
                ),
            ))
        }
        _ => Ok(()),
    }
}

/// Point every child of `data` (recursively) at its actual parent
pub(crate) fn re_parent(data: &Shared) {
    let weak = Rc::downgrade(data);
    let mut nested = Vec::new();
    {
        let mut d = data.borrow_mut();
        let children: Vec<&mut Node> = match &mut d.content {
            Content::Dict { items, .. } => items.values_mut().collect(),
            Content::List(items) => items.iter_mut().collect(),
        };
        for child in children {
            child.set_parent(Some(weak.clone()));
            match child {
                Node::Dict(c) => nested.push(c.inner.clone()),
                Node::List(c) => nested.push(c.inner.clone()),
                Node::Value(_) => {}
            }
        }
    }
    for child in nested {
        re_parent(&child);
    }
}

/// Independent copy of `data` and all descendants, detached from any parent
pub(crate) fn deep_copy(data: &Shared) -> Shared {
    let copy = {
        let d = data.borrow();
        let content = match &d.content {
            Content::Dict {
                items,
                declared_type,
            } => Content::Dict {
                items: items
                    .iter()
                    .map(|(k, node)| (k.clone(), node.deep_copy()))
                    .collect(),
                declared_type: declared_type.clone(),
            },
            Content::List(items) => Content::List(items.iter().map(Node::deep_copy).collect()),
        };
        Rc::new(RefCell::new(ContainerData {
            flags: d.flags,
            parent: None,
            element_type: d.element_type.clone(),
            resolvers: d.resolvers.clone(),
            content,
        }))
    };
    re_parent(&copy);
    copy
}

/// Read protocol: apply `default` when the node is absent, null or `???`, then resolve.
pub(crate) fn resolve_with_default(
    data: &Shared,
    key: &NodeKey,
    node: Option<&Node>,
    default: Option<Value>,
    stack: &mut Vec<String>,
) -> Result<Option<Resolved>> {
    if let Some(default) = default {
        let use_default = match node {
            None => true,
            Some(Node::Value(v)) => v.value().is_null() || v.is_missing(),
            Some(_) => false,
        };
        if use_default {
            return resolve_raw(data, key, &default, stack).map(Some);
        }
    }

    match node {
        None => Ok(None),
        Some(node) => resolve_node(data, key, node, stack).map(Some),
    }
}

/// Resolve a child node of `data` stored under `key`
pub(crate) fn resolve_node(
    data: &Shared,
    key: &NodeKey,
    node: &Node,
    stack: &mut Vec<String>,
) -> Result<Resolved> {
    match node {
        Node::Dict(d) => Ok(Resolved::Dict(d.clone())),
        Node::List(l) => Ok(Resolved::List(l.clone())),
        Node::Value(v) => resolve_raw(data, key, v.value(), stack),
    }
}

/// Resolve a raw stored value as if it lived under `key` in `data`
fn resolve_raw(
    data: &Shared,
    key: &NodeKey,
    raw: &Value,
    stack: &mut Vec<String>,
) -> Result<Resolved> {
    match value_kind_of(raw) {
        ValueKind::Value => Ok(Resolved::Value(raw.clone())),
        ValueKind::MandatoryMissing => Err(Error::missing_mandatory(full_key(data, Some(key)))),
        ValueKind::Interpolation(reference) => resolve_reference(data, key, &reference, stack),
        ValueKind::StrInterpolation(references) => {
            let template = raw.as_str().unwrap_or_default();
            let mut out = String::with_capacity(template.len());
            let mut last = 0;
            for reference in &references {
                out.push_str(&template[last..reference.start]);
                let resolved = resolve_reference(data, key, reference, stack)?;
                out.push_str(&resolved.to_string());
                last = reference.end;
            }
            out.push_str(&template[last..]);
            Ok(Resolved::Value(Value::String(out)))
        }
    }
}

fn resolve_reference(
    data: &Shared,
    key: &NodeKey,
    reference: &InterpolationRef,
    stack: &mut Vec<String>,
) -> Result<Resolved> {
    let path = full_key(data, Some(key));
    let root = root_of(data);

    if reference.is_self_reference() {
        if stack.contains(&reference.key) {
            let mut chain = stack.clone();
            chain.push(reference.key.clone());
            return Err(Error::circular_reference(path, chain));
        }

        log::trace!("Resolving '{}' -> '{}'", path, reference.key);
        stack.push(reference.key.clone());
        let result = select_path(&root, &reference.key, stack);
        stack.pop();

        return result?.ok_or_else(|| {
            Error::key_not_found(
                &path,
                format!("str interpolation key '{}' not found", reference.key),
            )
        });
    }

    let name = reference.prefix.as_deref().unwrap_or_default();
    let args = split_args(&reference.key);
    let local = root
        .borrow()
        .resolvers
        .as_ref()
        .and_then(|registry| registry.get(name).cloned());

    let value = match local {
        Some(resolver) => resolver.resolve(&args),
        None => {
            let registry = global_registry()
                .read()
                .map_err(|_| Error::internal("Global registry lock poisoned"))?;
            registry.resolve(name, &args)
        }
    }
    .map_err(|e| e.or_path(&path))?;

    log::trace!("Resolver '{}' produced {} for '{}'", name, value.type_name(), path);
    Ok(Resolved::Value(value))
}

/// Walk a dotted path from `data`; `None` if any segment is absent.
pub(crate) fn select_path(
    data: &Shared,
    path: &str,
    stack: &mut Vec<String>,
) -> Result<Option<Resolved>> {
    let mut current = data.clone();
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Some(next) = select_one(&current, segment, stack)? else {
            return Ok(None);
        };
        if segments.peek().is_none() {
            return Ok(Some(next));
        }
        current = match next {
            Resolved::Dict(d) => d.inner,
            Resolved::List(l) => l.inner,
            Resolved::Value(_) => return Ok(None),
        };
    }
    Ok(None)
}

/// Look up one child and resolve it. Absent keys, out-of-range indices
/// and `???` values all yield `None`.
fn select_one(data: &Shared, segment: &str, stack: &mut Vec<String>) -> Result<Option<Resolved>> {
    let (key, node) = {
        let d = data.borrow();
        match &d.content {
            Content::Dict { items, .. } => match items.get(segment) {
                Some(node) => (NodeKey::Str(segment.to_string()), node.clone()),
                None => return Ok(None),
            },
            Content::List(items) => {
                let index: i64 = segment.trim().parse().map_err(|_| {
                    Error::key_not_found(
                        full_key(data, None),
                        format!("Index {} is not an int", segment),
                    )
                })?;
                if index < 0 || index as usize >= items.len() {
                    return Ok(None);
                }
                let index = index as usize;
                (NodeKey::Index(index), items[index].clone())
            }
        }
    };

    match resolve_node(data, &key, &node, stack) {
        Ok(resolved) => Ok(Some(resolved)),
        Err(e) if e.is(&ErrorKind::MissingMandatoryValue) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Content with interpolations left as written
pub(crate) fn raw_value(data: &Shared) -> Value {
    let d = data.borrow();
    match &d.content {
        Content::Dict { items, .. } => Value::Mapping(
            items
                .iter()
                .map(|(k, node)| (k.clone(), node.raw_value()))
                .collect(),
        ),
        Content::List(items) => Value::Sequence(items.iter().map(Node::raw_value).collect()),
    }
}

/// Containers entered by an export or comparison that has not finished yet.
///
/// A pure interpolation may yield an ancestor container; walking into it
/// again would never terminate.
#[derive(Default)]
struct Walk {
    entered: Vec<(*const RefCell<ContainerData>, *const RefCell<ContainerData>)>,
    paths: Vec<String>,
}

impl Walk {
    fn enter(&mut self, a: &Shared, b: &Shared) -> Result<()> {
        let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
        let path = full_key(a, None);
        if self.entered.contains(&pair) {
            let mut chain: Vec<String> = self.paths.iter().map(|p| shown_key(p)).collect();
            chain.push(shown_key(&path));
            return Err(Error::circular_reference(path, chain));
        }
        self.entered.push(pair);
        self.paths.push(path);
        Ok(())
    }

    fn leave(&mut self) {
        self.entered.pop();
        self.paths.pop();
    }
}

fn shown_key(path: &str) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

/// Convert to a plain value; `???` is kept as written even when resolving
pub(crate) fn to_value(data: &Shared, resolve: bool) -> Result<Value> {
    if !resolve {
        return Ok(raw_value(data));
    }
    to_value_in(data, &mut Walk::default())
}

fn to_value_in(data: &Shared, walk: &mut Walk) -> Result<Value> {
    walk.enter(data, data)?;
    let result = resolved_content(data, walk);
    walk.leave();
    result
}

fn resolved_content(data: &Shared, walk: &mut Walk) -> Result<Value> {
    let entries: Vec<(NodeKey, Node)> = {
        let d = data.borrow();
        match &d.content {
            Content::Dict { items, .. } => items
                .iter()
                .map(|(k, n)| (NodeKey::Str(k.clone()), n.clone()))
                .collect(),
            Content::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, n)| (NodeKey::Index(i), n.clone()))
                .collect(),
        }
    };

    let mut values = Vec::with_capacity(entries.len());
    for (key, node) in &entries {
        let value = match node {
            Node::Value(v) if v.is_missing() => v.value().clone(),
            _ => {
                let mut stack = vec![full_key(data, Some(key))];
                match resolve_node(data, key, node, &mut stack)? {
                    Resolved::Value(v) => v,
                    Resolved::Dict(d) => to_value_in(&d.inner, walk)?,
                    Resolved::List(l) => to_value_in(&l.inner, walk)?,
                }
            }
        };
        values.push(value);
    }

    let is_dict = matches!(data.borrow().content, Content::Dict { .. });
    Ok(if is_dict {
        Value::Mapping(
            entries
                .into_iter()
                .zip(values)
                .map(|((key, _), value)| (key.to_string(), value))
                .collect(),
        )
    } else {
        Value::Sequence(values)
    })
}

/// Value of a child for equality: resolved, except that `???` compares as written
fn comparable(data: &Shared, key: &NodeKey, node: &Node) -> Result<Resolved> {
    match node {
        Node::Value(v) if v.is_missing() => Ok(Resolved::Value(v.value().clone())),
        _ => {
            let mut stack = vec![full_key(data, Some(key))];
            resolve_node(data, key, node, &mut stack)
        }
    }
}

/// Equality of two read results; plain mappings and sequences are wrapped first
pub(crate) fn resolved_eq(a: &Resolved, b: &Resolved) -> Result<bool> {
    resolved_eq_in(a, b, &mut Walk::default())
}

fn resolved_eq_in(a: &Resolved, b: &Resolved, walk: &mut Walk) -> Result<bool> {
    match (a, b) {
        (Resolved::Value(x), Resolved::Value(y)) => Ok(values_equal(x, y)),
        (Resolved::Dict(x), Resolved::Dict(y)) => dict_eq_in(&x.inner, &y.inner, walk),
        (Resolved::List(x), Resolved::List(y)) => list_eq_in(&x.inner, &y.inner, walk),
        (Resolved::Dict(d), Resolved::Value(Value::Mapping(map)))
        | (Resolved::Value(Value::Mapping(map)), Resolved::Dict(d)) => {
            let wrapped = DictConfig::from_mapping(map.clone())?;
            dict_eq_in(&d.inner, &wrapped.inner, walk)
        }
        (Resolved::List(l), Resolved::Value(Value::Sequence(values)))
        | (Resolved::Value(Value::Sequence(values)), Resolved::List(l)) => {
            let wrapped = ListConfig::from_values(values.clone())?;
            list_eq_in(&l.inner, &wrapped.inner, walk)
        }
        _ => Ok(false),
    }
}

/// Two mappings are equal when they have the same keys and equal resolved values
pub(crate) fn dict_eq(a: &Shared, b: &Shared) -> Result<bool> {
    dict_eq_in(a, b, &mut Walk::default())
}

fn dict_eq_in(a: &Shared, b: &Shared, walk: &mut Walk) -> Result<bool> {
    if Rc::ptr_eq(a, b) {
        return Ok(true);
    }
    let (left, right): (Vec<(String, Node)>, IndexMap<String, Node>) = {
        let da = a.borrow();
        let db = b.borrow();
        (
            da.dict_items()
                .iter()
                .map(|(k, n)| (k.clone(), n.clone()))
                .collect(),
            db.dict_items().clone(),
        )
    };
    if left.len() != right.len() {
        return Ok(false);
    }

    walk.enter(a, b)?;
    let result = (|| -> Result<bool> {
        for (key, node_a) in &left {
            let Some(node_b) = right.get(key) else {
                return Ok(false);
            };
            let node_key = NodeKey::Str(key.clone());
            let va = comparable(a, &node_key, node_a)?;
            let vb = comparable(b, &node_key, node_b)?;
            if !resolved_eq_in(&va, &vb, walk)? {
                return Ok(false);
            }
        }
        Ok(true)
    })();
    walk.leave();
    result
}

/// Two sequences are equal when they have equal resolved values at every position
pub(crate) fn list_eq(a: &Shared, b: &Shared) -> Result<bool> {
    list_eq_in(a, b, &mut Walk::default())
}

fn list_eq_in(a: &Shared, b: &Shared, walk: &mut Walk) -> Result<bool> {
    if Rc::ptr_eq(a, b) {
        return Ok(true);
    }
    let (left, right) = {
        let da = a.borrow();
        let db = b.borrow();
        (da.list_items().clone(), db.list_items().clone())
    };
    if left.len() != right.len() {
        return Ok(false);
    }

    walk.enter(a, b)?;
    let result = (|| -> Result<bool> {
        for (index, (node_a, node_b)) in left.iter().zip(&right).enumerate() {
            let key = NodeKey::Index(index);
            let va = comparable(a, &key, node_a)?;
            let vb = comparable(b, &key, node_b)?;
            if !resolved_eq_in(&va, &vb, walk)? {
                return Ok(false);
            }
        }
        Ok(true)
    })();
    walk.leave();
    result
}

/// Restores a flag override when dropped
#[must_use = "the previous flag value is restored when the guard is dropped"]
pub struct FlagGuard {
    target: Shared,
    flag: Flag,
    previous: Option<bool>,
}

impl FlagGuard {
    pub(crate) fn new(target: &Shared, flag: Flag, value: Option<bool>) -> Self {
        let previous = target.borrow().flags.get(flag);
        target.borrow_mut().flags.set(flag, value);
        Self {
            target: target.clone(),
            flag,
            previous,
        }
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.target.borrow_mut().flags.set(self.flag, self.previous);
    }
}

mod private {
    pub trait Sealed {
        fn shared(&self) -> &super::Shared;
    }
}

pub(crate) use private::Sealed;

/// Behaviour shared by [`DictConfig`], [`ListConfig`] and [`Config`]
pub trait Container: private::Sealed {
    /// Effective value of a flag, inherited from the nearest ancestor that sets it
    fn get_flag(&self, flag: Flag) -> bool {
        get_flag(self.shared(), flag)
    }

    /// This container's own override, `None` if it inherits
    fn get_node_flag(&self, flag: Flag) -> Option<bool> {
        self.shared().borrow().flags.get(flag)
    }

    fn set_flag(&self, flag: Flag, value: Option<bool>) {
        self.shared().borrow_mut().flags.set(flag, value);
    }

    fn is_readonly(&self) -> bool {
        self.get_flag(Flag::Readonly)
    }

    fn set_readonly(&self, value: Option<bool>) {
        self.set_flag(Flag::Readonly, value);
    }

    fn is_struct(&self) -> bool {
        self.get_flag(Flag::Struct)
    }

    fn set_struct(&self, value: Option<bool>) {
        self.set_flag(Flag::Struct, value);
    }

    /// Override a flag until the returned guard is dropped
    fn flag_guard(&self, flag: Flag, value: Option<bool>) -> FlagGuard {
        FlagGuard::new(self.shared(), flag, value)
    }

    /// Run `f` with `flag` overridden on this container; the previous
    /// override is restored however `f` exits
    fn flag_override<R, F>(&self, flag: Flag, value: bool, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(&Self) -> R,
    {
        let _guard = self.flag_guard(flag, Some(value));
        f(self)
    }

    /// Run `f` with read-only mode lifted
    fn read_write<R, F>(&self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(&Self) -> R,
    {
        self.flag_override(Flag::Readonly, false, f)
    }

    /// Run `f` with struct mode lifted
    fn open_dict<R, F>(&self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(&Self) -> R,
    {
        self.flag_override(Flag::Struct, false, f)
    }

    /// Dotted path of this container from the root (empty at the root)
    fn full_key(&self) -> String {
        full_key(self.shared(), None)
    }

    fn parent(&self) -> Option<Config> {
        self.shared().borrow().parent().map(Config::from_shared)
    }

    fn root(&self) -> Config {
        Config::from_shared(root_of(self.shared()))
    }

    /// Declared type applied to children assigned without one
    fn element_type(&self) -> ValueType {
        self.shared().borrow().element_type.clone()
    }

    fn len(&self) -> usize {
        self.shared().borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a dotted path relative to this container.
    ///
    /// Returns `None` if a segment is missing, an index is out of range,
    /// or the value is still `???`. An empty path selects the container itself.
    fn select(&self, path: &str) -> Result<Option<Resolved>> {
        if path.is_empty() {
            return Ok(Some(Config::from_shared(self.shared().clone()).into()));
        }
        let mut stack = Vec::new();
        select_path(self.shared(), path, &mut stack)
    }

    /// Convert to a plain value, optionally resolving interpolations
    fn to_value(&self, resolve: bool) -> Result<Value> {
        to_value(self.shared(), resolve)
    }

    fn to_yaml(&self, resolve: bool) -> Result<String> {
        let value = self.to_value(resolve)?;
        serde_yaml::to_string(&value).map_err(|e| Error::parse(e.to_string()))
    }

    fn to_json(&self, resolve: bool) -> Result<String> {
        let value = self.to_value(resolve)?;
        serde_json::to_string_pretty(&value).map_err(|e| Error::parse(e.to_string()))
    }

    /// Register a resolver for this whole tree (stored on the root)
    fn register_resolver(&self, resolver: Arc<dyn Resolver>) {
        let root = root_of(self.shared());
        let mut root = root.borrow_mut();
        root.resolvers
            .get_or_insert_with(ResolverRegistry::new)
            .register(resolver);
    }

    /// Register a closure as a resolver for this whole tree
    fn register_resolver_fn<F>(&self, name: &str, func: F)
    where
        Self: Sized,
        F: Fn(&[String]) -> Result<Value> + Send + Sync + 'static,
    {
        let root = root_of(self.shared());
        let mut root = root.borrow_mut();
        root.resolvers
            .get_or_insert_with(ResolverRegistry::new)
            .register_fn(name, func);
    }
}
