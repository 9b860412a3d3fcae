//! Structured schemas
//!
//! A [`StructuredType`] declares named, typed fields with optional defaults.
//! Binding a type (or a [`StructuredObject`] instance with per-field
//! overrides) produces a typed [`DictConfig`](crate::DictConfig) that rejects
//! unknown keys and converts assignments to each field's declared type.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::dictconfig::DictConfig;
use crate::error::{Error, Result};
use crate::interpolation::MISSING;
use crate::listconfig::ListConfig;
use crate::node::Node;
use crate::nodes::{ValueNode, ValueType};
use crate::value::{EnumValue, Value};

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A scalar of the given type
    Value(ValueType),
    /// A mapping whose values have the given type
    Dict(ValueType),
    /// A sequence whose elements have the given type
    List(ValueType),
    /// A nested schema
    Structured(StructuredType),
}

impl From<ValueType> for FieldType {
    fn from(ty: ValueType) -> Self {
        FieldType::Value(ty)
    }
}

impl From<StructuredType> for FieldType {
    fn from(ty: StructuredType) -> Self {
        FieldType::Structured(ty)
    }
}

/// A default or override for a field: plain data or a nested instance
#[derive(Debug, Clone)]
pub enum FieldValue {
    Value(Value),
    Object(StructuredObject),
}

impl FieldValue {
    fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Value(v) if is_unset(v))
    }
}

/// Null or `???`
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s == MISSING,
        _ => false,
    }
}

macro_rules! field_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::Value(Value::from(v))
                }
            }
        )*
    };
}

field_value_from!(bool, i32, i64, f64, &str, String, EnumValue, IndexMap<String, Value>);

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Value(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for FieldValue {
    fn from(v: Vec<T>) -> Self {
        FieldValue::Value(Value::from(v))
    }
}

impl From<StructuredObject> for FieldValue {
    fn from(obj: StructuredObject) -> Self {
        FieldValue::Object(obj)
    }
}

impl From<StructuredType> for FieldValue {
    fn from(ty: StructuredType) -> Self {
        FieldValue::Object(ty.instance())
    }
}

/// One named field of a schema
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    ty: FieldType,
    optional: bool,
    default: Option<FieldValue>,
}

impl Field {
    /// A required field with no default
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            optional: false,
            default: None,
        }
    }

    /// Allow null; an optional field without a default starts as null
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default(&self) -> Option<&FieldValue> {
        self.default.as_ref()
    }
}

#[derive(Debug)]
struct StructDef {
    name: String,
    frozen: bool,
    fields: Vec<Field>,
}

/// A named schema. Two types are equal only if they are the same declaration.
#[derive(Debug, Clone)]
pub struct StructuredType(Arc<StructDef>);

impl StructuredType {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self::build(name.into(), false, fields)
    }

    /// A schema whose bound configs are read-only
    pub fn frozen(name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self::build(name.into(), true, fields)
    }

    fn build(name: String, frozen: bool, fields: impl IntoIterator<Item = Field>) -> Self {
        Self(Arc::new(StructDef {
            name,
            frozen,
            fields: fields.into_iter().collect(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn is_frozen(&self) -> bool {
        self.0.frozen
    }

    pub fn fields(&self) -> &[Field] {
        &self.0.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.0.fields.iter().find(|f| f.name == name)
    }

    /// An instance using every field's default
    pub fn instance(&self) -> StructuredObject {
        StructuredObject::new(self.clone())
    }
}

impl PartialEq for StructuredType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// An instance of a schema: the type plus values overriding its defaults
#[derive(Debug, Clone)]
pub struct StructuredObject {
    ty: StructuredType,
    values: IndexMap<String, FieldValue>,
}

impl StructuredObject {
    pub fn new(ty: StructuredType) -> Self {
        Self {
            ty,
            values: IndexMap::new(),
        }
    }

    /// Override the value of `field`
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn structured_type(&self) -> &StructuredType {
        &self.ty
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }
}

impl From<StructuredType> for StructuredObject {
    fn from(ty: StructuredType) -> Self {
        ty.instance()
    }
}

impl From<&StructuredType> for StructuredObject {
    fn from(ty: &StructuredType) -> Self {
        ty.instance()
    }
}

/// Build the detached field nodes of `obj`, in declaration order
pub(crate) fn structured_fields(obj: &StructuredObject) -> Result<IndexMap<String, Node>> {
    let ty = obj.structured_type();

    if let Some(unknown) = obj.values.keys().find(|name| ty.field(name).is_none()) {
        return Err(Error::schema_definition(format!(
            "{} has no field named '{}'",
            ty.name(),
            unknown
        )));
    }

    let mut nodes = IndexMap::with_capacity(ty.fields().len());
    for field in ty.fields() {
        let value = field_value(obj, field)?;
        let node = wrap_field(field, value).map_err(|e| e.within(&field.name))?;
        nodes.insert(field.name.clone(), node);
    }
    log::trace!("Bound {} fields of {}", nodes.len(), ty.name());
    Ok(nodes)
}

fn field_value(obj: &StructuredObject, field: &Field) -> Result<FieldValue> {
    let value = match (obj.value(&field.name), &field.default, &field.ty) {
        (Some(value), _, _) => value.clone(),
        (None, Some(default), _) => default.clone(),
        (None, None, FieldType::Structured(nested)) => FieldValue::Object(nested.instance()),
        (None, None, _) if field.optional => FieldValue::Value(Value::Null),
        (None, None, _) => {
            return Err(Error::schema_definition(format!(
                "Missing default value for {}, to indicate default must be populated later use '{}'",
                field.name, MISSING
            )))
        }
    };

    if matches!(field.ty, FieldType::Structured(_)) && value.is_unset() {
        return Err(Error::schema_definition(format!(
            "Nested value {} must not be None or {}",
            field.name, MISSING
        )));
    }
    Ok(value)
}

fn wrap_field(field: &Field, value: FieldValue) -> Result<Node> {
    let optional = field.optional;
    match (&field.ty, value) {
        (FieldType::Structured(expected), FieldValue::Object(obj)) => {
            if obj.structured_type() != expected {
                return Err(mismatch(expected.name(), obj.structured_type().name()));
            }
            Ok(Node::Dict(DictConfig::from_structured(obj)?))
        }
        (FieldType::Structured(expected), FieldValue::Value(Value::Mapping(map))) => {
            let obj = map
                .into_iter()
                .fold(expected.instance(), |obj, (k, v)| obj.with(k, v));
            Ok(Node::Dict(DictConfig::from_structured(obj)?))
        }
        (FieldType::Structured(expected), FieldValue::Value(other)) => {
            Err(mismatch(expected.name(), other.type_name()))
        }
        (FieldType::Value(ValueType::Any), FieldValue::Object(obj)) => {
            Ok(Node::Dict(DictConfig::from_structured(obj)?))
        }
        (_, FieldValue::Object(obj)) => Err(Error::validation(
            "",
            format!(
                "Cannot assign {} to a field of type {:?}",
                obj.structured_type().name(),
                field.ty
            ),
        )),
        (FieldType::Dict(element), FieldValue::Value(Value::Mapping(map))) => Ok(Node::Dict(
            DictConfig::typed_from(element.clone(), map)?,
        )),
        (FieldType::List(element), FieldValue::Value(Value::Sequence(values))) => Ok(Node::List(
            ListConfig::typed_from(element.clone(), values)?,
        )),
        (FieldType::Dict(_) | FieldType::List(_), FieldValue::Value(value)) => {
            if !is_unset(&value) {
                return Err(Error::validation(
                    "",
                    format!(
                        "Value of type {} does not match field type {:?}",
                        value.type_name(),
                        field.ty
                    ),
                ));
            }
            if value.is_null() && !optional {
                return Err(Error::validation(
                    "",
                    "Non optional field cannot be assigned None",
                ));
            }
            Ok(Node::Value(ValueNode::untyped(value)?))
        }
        (FieldType::Value(ValueType::Any), FieldValue::Value(Value::Mapping(map))) => {
            Ok(Node::Dict(DictConfig::from_mapping(map)?))
        }
        (FieldType::Value(ValueType::Any), FieldValue::Value(Value::Sequence(values))) => {
            Ok(Node::List(ListConfig::from_values(values)?))
        }
        (FieldType::Value(ty), FieldValue::Value(value)) => {
            Ok(Node::Value(ValueNode::new(ty.clone(), optional, value)?))
        }
    }
}

fn mismatch(expected: &str, got: &str) -> Error {
    Error::validation(
        "",
        format!("Invalid type assigned : {} != {}", expected, got),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use crate::error::ErrorKind;
    use crate::value::EnumType;

    fn point() -> StructuredType {
        StructuredType::new(
            "Point",
            [
                Field::new("x", ValueType::Int).with_default(0),
                Field::new("y", ValueType::Int).with_default(0),
                Field::new("label", ValueType::Str).optional(),
            ],
        )
    }

    #[test]
    fn test_defaults_are_bound() {
        let cfg = DictConfig::from_structured(point()).unwrap();
        assert_eq!(cfg.keys(), vec!["x", "y", "label"]);
        assert_eq!(cfg.get("x").unwrap().unwrap(), Value::Integer(0));
        assert!(cfg.get("label").unwrap().unwrap().is_null());
        assert_eq!(cfg.declared_type().unwrap().name(), "Point");
    }

    #[test]
    fn test_overrides() {
        let obj = point().instance().with("x", 5).with("label", "origin");
        let cfg = DictConfig::from_structured(obj).unwrap();
        assert_eq!(cfg.get_i64("x").unwrap(), 5);
        assert_eq!(cfg.get_str("label").unwrap(), "origin");
    }

    #[test]
    fn test_override_is_converted() {
        let obj = point().instance().with("x", "12");
        let cfg = DictConfig::from_structured(obj).unwrap();
        assert_eq!(cfg.get("x").unwrap().unwrap(), Value::Integer(12));

        let obj = point().instance().with("x", "twelve");
        let err = DictConfig::from_structured(obj).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.path, Some("x".into()));
    }

    #[test]
    fn test_unknown_override() {
        let obj = point().instance().with("z", 1);
        let err = DictConfig::from_structured(obj).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaDefinition);
    }

    #[test]
    fn test_missing_default() {
        let ty = StructuredType::new("Bad", [Field::new("n", ValueType::Int)]);
        let err = DictConfig::from_structured(ty).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaDefinition);
        assert!(err
            .to_string()
            .contains("Missing default value for n, to indicate default must be populated later use '???'"));
    }

    #[test]
    fn test_nested_must_not_be_unset() {
        let ty = StructuredType::new(
            "Outer",
            [Field::new("inner", point()).with_default(Value::Null)],
        );
        let err = DictConfig::from_structured(ty).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaDefinition);
        assert!(err.to_string().contains("Nested value inner must not be None or ???"));
    }

    #[test]
    fn test_nested_from_mapping_override() {
        let p = point();
        let ty = StructuredType::new("Outer", [Field::new("inner", p.clone())]);
        let mut map = IndexMap::new();
        map.insert("x".to_string(), Value::Integer(3));
        let cfg = DictConfig::from_structured(ty.instance().with("inner", map)).unwrap();

        let inner = cfg.get_dict("inner").unwrap();
        assert_eq!(inner.get_i64("x").unwrap(), 3);
        assert_eq!(inner.declared_type(), Some(p));
    }

    #[test]
    fn test_nested_type_mismatch() {
        let other = StructuredType::new("Other", []);
        let ty = StructuredType::new("Outer", [Field::new("inner", point())]);
        let err = DictConfig::from_structured(ty.instance().with("inner", other)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.to_string().contains("Invalid type assigned : Point != Other"));
        assert_eq!(err.path, Some("inner".into()));
    }

    #[test]
    fn test_typed_containers() {
        let height = EnumType::new("Height", [("SHORT", 0), ("TALL", 1)]);
        let ty = StructuredType::new(
            "Containers",
            [
                Field::new("ints", FieldType::List(ValueType::Int))
                    .with_default(vec![Value::from("1"), Value::from(2)]),
                Field::new("heights", FieldType::Dict(ValueType::Enum(height.clone())))
                    .with_default(Value::Mapping(IndexMap::from([(
                        "Yoda".to_string(),
                        Value::from("SHORT"),
                    )]))),
                Field::new("later", FieldType::List(ValueType::Str)).with_default(MISSING),
            ],
        );

        let cfg = DictConfig::from_structured(ty).unwrap();
        assert_eq!(
            cfg.get_list("ints").unwrap(),
            Value::from(vec![1, 2])
        );
        assert_eq!(
            cfg.get_enum("heights.Yoda").unwrap(),
            height.member("SHORT").unwrap()
        );
        assert!(!cfg.contains_key("later"));
    }

    #[test]
    fn test_frozen_type() {
        let ty = StructuredType::frozen(
            "Frozen",
            [Field::new("x", ValueType::Int).with_default(10)],
        );
        let cfg = DictConfig::from_structured(ty).unwrap();
        assert!(cfg.is_readonly());
        assert_eq!(cfg.set("x", 1).unwrap_err().kind, ErrorKind::Readonly);
    }

    #[test]
    fn test_type_identity() {
        let p = point();
        assert_eq!(p, p.clone());
        assert_ne!(point(), point());
    }
}
