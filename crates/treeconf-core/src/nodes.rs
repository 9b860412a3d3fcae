//! Scalar value nodes
//!
//! A [`ValueNode`] owns exactly one scalar and the declared type that
//! governs what may be assigned to it. Interpolations (`${...}`) and the
//! mandatory-missing sentinel (`???`) are stored verbatim; everything else
//! goes through [`ValueType`] conversion.

use std::fmt;
use std::rc::Weak;

use crate::config::Config;
use crate::container::{self, WeakShared};
use crate::error::{Error, Result};
use crate::flags::{Flag, Flags};
use crate::interpolation::{get_value_kind, ValueKind};
use crate::value::{EnumType, Value};

/// Declared type of a value node, or the element type of a container
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueType {
    /// Accepts any scalar
    #[default]
    Any,
    Str,
    Int,
    Float,
    Bool,
    Enum(EnumType),
}

impl ValueType {
    /// Check and convert an incoming value to this type's canonical form.
    ///
    /// Null is not handled here; optionality is the node's concern.
    pub fn validate_and_convert(&self, value: Value) -> Result<Value> {
        match self {
            ValueType::Any => match value {
                Value::Sequence(_) | Value::Mapping(_) => Err(Error::unsupported_value_type(
                    "",
                    format!("Unsupported value type {}", value.type_name()),
                )),
                other => Ok(other),
            },
            ValueType::Str => match value {
                Value::String(_) => Ok(value),
                Value::Sequence(_) | Value::Mapping(_) => Err(Error::validation(
                    "",
                    format!("Value '{}' could not be converted to str", value),
                )),
                other => Ok(Value::String(other.to_string())),
            },
            ValueType::Int => match &value {
                Value::Integer(i) => Ok(Value::Integer(*i)),
                Value::String(s) => s.trim().parse::<i64>().map(Value::Integer).map_err(|_| {
                    Error::validation(
                        "",
                        format!("Value '{}' could not be converted to Integer", s),
                    )
                }),
                other => Err(Error::validation(
                    "",
                    format!("Value '{}' could not be converted to Integer", other),
                )),
            },
            ValueType::Float => match &value {
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Integer(i) => Ok(Value::Float(*i as f64)),
                Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                    Error::validation("", format!("Value '{}' could not be converted to float", s))
                }),
                other => Err(Error::validation(
                    "",
                    format!("Value '{}' could not be converted to float", other),
                )),
            },
            ValueType::Bool => match &value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Integer(i) => Ok(Value::Bool(*i != 0)),
                Value::String(s) => {
                    if let Ok(i) = s.trim().parse::<i64>() {
                        return Ok(Value::Bool(i != 0));
                    }
                    match s.to_lowercase().as_str() {
                        "yes" | "y" | "on" | "true" => Ok(Value::Bool(true)),
                        "no" | "n" | "off" | "false" => Ok(Value::Bool(false)),
                        _ => Err(Error::validation(
                            "",
                            format!("Value '{}' is not a valid bool", s),
                        )),
                    }
                }
                other => Err(Error::validation(
                    "",
                    format!(
                        "Value '{}' is not a valid bool (type {})",
                        other,
                        other.type_name()
                    ),
                )),
            },
            ValueType::Enum(enum_type) => convert_enum(enum_type, value),
        }
    }

    /// Whether strings with embedded references may be stored
    fn accepts_str_interpolation(&self) -> bool {
        matches!(self, ValueType::Any | ValueType::Str)
    }
}

fn convert_enum(enum_type: &EnumType, value: Value) -> Result<Value> {
    let invalid = |shown: &dyn fmt::Display| {
        Error::validation(
            "",
            format!(
                "Invalid value '{}', expected one of: {}",
                shown,
                enum_type.member_names().join(", ")
            ),
        )
    };

    match &value {
        Value::Enum(member) if member.enum_type() == enum_type => Ok(Value::Enum(member.clone())),
        Value::String(s) => {
            let prefix = format!("{}.", enum_type.name());
            let name = s.strip_prefix(prefix.as_str()).unwrap_or(s);
            enum_type
                .member(name)
                .map(Value::Enum)
                .ok_or_else(|| invalid(s))
        }
        Value::Integer(i) => enum_type
            .from_value(*i)
            .map(Value::Enum)
            .ok_or_else(|| invalid(i)),
        other => Err(Error::validation(
            "",
            format!(
                "Value {} ({}) is not a valid input for {}",
                other,
                other.type_name(),
                enum_type
            ),
        )),
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Any => write!(f, "Any"),
            ValueType::Str => write!(f, "str"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Enum(e) => write!(f, "{}", e),
        }
    }
}

/// A leaf of the config tree holding a single scalar
#[derive(Debug, Clone)]
pub struct ValueNode {
    value_type: ValueType,
    value: Value,
    optional: bool,
    flags: Flags,
    pub(crate) parent: Option<WeakShared>,
}

impl ValueNode {
    /// Create a node of the given type and assign its initial value.
    ///
    /// Untyped nodes are always optional.
    pub fn new(value_type: ValueType, optional: bool, value: impl Into<Value>) -> Result<Self> {
        let optional = optional || value_type == ValueType::Any;
        let mut node = Self {
            value_type,
            value: Value::Null,
            optional,
            flags: Flags::default(),
            parent: None,
        };
        node.set_value(value)?;
        Ok(node)
    }

    pub fn untyped(value: impl Into<Value>) -> Result<Self> {
        Self::new(ValueType::Any, true, value)
    }

    pub fn string(value: impl Into<Value>) -> Result<Self> {
        Self::new(ValueType::Str, true, value)
    }

    pub fn integer(value: impl Into<Value>) -> Result<Self> {
        Self::new(ValueType::Int, true, value)
    }

    pub fn float(value: impl Into<Value>) -> Result<Self> {
        Self::new(ValueType::Float, true, value)
    }

    pub fn boolean(value: impl Into<Value>) -> Result<Self> {
        Self::new(ValueType::Bool, true, value)
    }

    pub fn enumeration(enum_type: EnumType, value: impl Into<Value>) -> Result<Self> {
        Self::new(ValueType::Enum(enum_type), true, value)
    }

    /// Same node, but rejecting null
    pub fn required(mut self) -> Result<Self> {
        if self.value_type == ValueType::Any {
            return Ok(self);
        }
        if self.value.is_null() {
            return Err(Error::validation(
                "",
                "Non optional field cannot be assigned None",
            ));
        }
        self.optional = false;
        Ok(self)
    }

    /// The stored value, without resolving interpolations
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// True if the node still holds `???`
    pub fn is_missing(&self) -> bool {
        matches!(&self.value, Value::String(s) if get_value_kind(s) == ValueKind::MandatoryMissing)
    }

    /// True if the stored value is a `${...}` string (pure or embedded)
    pub fn is_interpolation(&self) -> bool {
        match &self.value {
            Value::String(s) => get_value_kind(s).is_interpolation(),
            _ => false,
        }
    }

    /// Assign a new value. On failure the previous value is kept.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if let Value::String(s) = &value {
            match get_value_kind(s) {
                ValueKind::MandatoryMissing | ValueKind::Interpolation(_) => {
                    self.value = value;
                    return Ok(());
                }
                ValueKind::StrInterpolation(_) if !self.value_type.accepts_str_interpolation() => {
                    return Err(Error::unsupported_interpolation(
                        "",
                        format!(
                            "String interpolation '{}' cannot be stored in a {} node",
                            s, self.value_type
                        ),
                    ));
                }
                _ => {}
            }
        }

        if value.is_null() {
            if !self.optional {
                return Err(Error::validation(
                    "",
                    "Non optional field cannot be assigned None",
                ));
            }
            self.value = Value::Null;
            return Ok(());
        }

        self.value = self.value_type.validate_and_convert(value)?;
        Ok(())
    }

    /// This node's own override for a flag
    pub fn get_node_flag(&self, flag: Flag) -> Option<bool> {
        self.flags.get(flag)
    }

    /// Effective flag value: own override, else the nearest ancestor's, else false
    pub fn get_flag(&self, flag: Flag) -> bool {
        if let Some(value) = self.flags.get(flag) {
            return value;
        }
        self.parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|parent| container::get_flag(&parent, flag))
            .unwrap_or(false)
    }

    pub fn set_flag(&mut self, flag: Flag, value: Option<bool>) {
        self.flags.set(flag, value);
    }

    /// The container holding this node, if it is still attached
    pub fn parent(&self) -> Option<Config> {
        self.parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Config::from_shared)
    }
}

/// Scalar equality used by nodes and containers.
///
/// NaN equals NaN, and integers compare numerically with floats.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Integer(i), Value::Float(f)) | (Value::Float(f), Value::Integer(i)) => {
            *i as f64 == *f
        }
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (Value::Mapping(x), Value::Mapping(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map(|w| values_equal(v, w)).unwrap_or(false))
        }
        _ => a == b,
    }
}

impl PartialEq for ValueNode {
    fn eq(&self, other: &Self) -> bool {
        self.optional == other.optional && values_equal(&self.value, &other.value)
    }
}

impl PartialEq<Value> for ValueNode {
    fn eq(&self, other: &Value) -> bool {
        values_equal(&self.value, other)
    }
}

impl fmt::Display for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
