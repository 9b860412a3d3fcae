//! Error types for treeconf
//!
//! Errors are structured: a kind, the dotted path of the node that failed
//! (e.g. `server.ports.0`), an optional cause and an actionable help message.

use std::fmt;

/// Result type alias for treeconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for treeconf operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Full dotted path of the offending node, from the tree root
    pub path: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// A value failed type conversion, or a structured node got an incompatible type
    #[error("Validation error")]
    Validation,
    /// The value has no wrapping rule
    #[error("Unsupported value type")]
    UnsupportedValueType,
    /// A mapping was given a non-string key
    #[error("Unsupported key type")]
    UnsupportedKeyType,
    /// Mutation of a read-only subtree
    #[error("Config is read-only")]
    Readonly,
    /// Read of a value still set to `???`
    #[error("Missing mandatory value")]
    MissingMandatoryValue,
    /// Unknown resolver prefix, or interpolation inside a non-string node
    #[error("Unsupported interpolation type")]
    UnsupportedInterpolationType,
    /// Unknown key under struct mode, or a reference that does not resolve
    #[error("Key not found")]
    KeyNotFound,
    /// Interpolations that reference each other
    #[error("Circular reference detected")]
    CircularReference,
    /// Typed getter could not coerce the resolved value
    #[error("Type coercion failed")]
    TypeCoercion,
    /// A structured schema is not usable as declared
    #[error("Invalid schema definition")]
    SchemaDefinition,
    /// Error parsing YAML/JSON, or an invalid path/flag name
    #[error("Parse error")]
    Parse,
    /// A custom resolver failed
    #[error("Resolver '{name}' failed")]
    Resolver { name: String },
    /// Internal error (bug in treeconf)
    #[error("Internal error")]
    Internal,
}

fn normalize_path(path: String) -> Option<String> {
    if path.is_empty() || path == "<root>" {
        None
    } else {
        Some(path)
    }
}

impl Error {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            help: None,
            cause: None,
        }
    }

    /// Create a validation error
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            help: Some("Fix the value to match the declared type".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Validation)
        }
    }

    /// Create an unsupported value type error
    pub fn unsupported_value_type(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::UnsupportedValueType)
        }
    }

    /// Create an unsupported key type error
    pub fn unsupported_key_type(message: impl Into<String>) -> Self {
        Self {
            help: Some("Mapping keys must be strings".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::UnsupportedKeyType)
        }
    }

    /// Create a read-only error
    pub fn readonly(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            help: Some("Use read_write() to modify a read-only config".into()),
            ..Self::new(ErrorKind::Readonly)
        }
    }

    /// Create a missing mandatory value error
    pub fn missing_mandatory(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            help: Some("Assign a value before reading this key".into()),
            ..Self::new(ErrorKind::MissingMandatoryValue)
        }
    }

    /// Create an unsupported interpolation type error
    pub fn unsupported_interpolation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::UnsupportedInterpolationType)
        }
    }

    /// Create a key not found error
    pub fn key_not_found(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::KeyNotFound)
        }
    }

    /// Create a circular reference error
    pub fn circular_reference(path: impl Into<String>, chain: Vec<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            help: Some("Break the circular dependency by removing one of the references".into()),
            cause: Some(format!("Chain: {}", chain.join(" -> "))),
            ..Self::new(ErrorKind::CircularReference)
        }
    }

    /// Create a type coercion error
    pub fn type_coercion(
        path: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        Self {
            path: normalize_path(path.into()),
            help: Some(format!(
                "Ensure the value can be converted to {}",
                expected.into()
            )),
            cause: Some(format!("Got: {}", got.into())),
            ..Self::new(ErrorKind::TypeCoercion)
        }
    }

    /// Create a schema definition error
    pub fn schema_definition(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::SchemaDefinition)
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Parse)
        }
    }

    /// Create a custom resolver error
    pub fn resolver(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            help: Some(format!("Check the '{}' resolver implementation", name)),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Resolver { name })
        }
    }

    /// Create an internal error (bug in treeconf)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            help: Some("This is likely a bug in treeconf. Please report it.".into()),
            cause: Some(message.into()),
            ..Self::new(ErrorKind::Internal)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = normalize_path(path.into());
        self
    }

    /// Add path context only if the error does not carry one yet
    pub fn or_path(self, path: impl Into<String>) -> Self {
        if self.path.is_some() {
            self
        } else {
            self.with_path(path)
        }
    }

    /// Re-root a path reported relative to a detached subtree under `prefix`
    pub(crate) fn within(mut self, prefix: &str) -> Self {
        if prefix.is_empty() {
            return self;
        }
        self.path = Some(match self.path.take() {
            Some(path) => format!("{}.{}", prefix, path),
            None => prefix.to_string(),
        });
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Check the error category
    pub fn is(&self, kind: &ErrorKind) -> bool {
        &self.kind == kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readonly_error_display() {
        let err = Error::readonly("server.port");
        let display = format!("{}", err);

        assert!(display.contains("Config is read-only"));
        assert!(display.contains("Path: server.port"));
        assert!(display.contains("Help: Use read_write()"));
    }

    #[test]
    fn test_circular_reference_error_display() {
        let err = Error::circular_reference("a", vec!["a".into(), "b".into(), "a".into()]);
        let display = format!("{}", err);

        assert!(display.contains("Circular reference detected"));
        assert!(display.contains("a -> b -> a"));
    }

    #[test]
    fn test_key_not_found_error() {
        let err = Error::key_not_found("db.host", "interpolation key 'db.host' not found");

        assert_eq!(err.kind, ErrorKind::KeyNotFound);
        assert_eq!(err.path, Some("db.host".into()));
        assert!(err.to_string().contains("interpolation key 'db.host' not found"));
    }

    #[test]
    fn test_resolver_error_display() {
        let err = Error::resolver("vault", "connection refused");
        let display = format!("{}", err);

        assert!(display.contains("Resolver 'vault' failed"));
        assert!(display.contains("connection refused"));
        assert!(display.contains("Help:"));
    }

    #[test]
    fn test_validation_error_root_path() {
        let err = Error::validation("<root>", "bad value");
        assert!(err.path.is_none());

        let err2 = Error::validation("", "bad value");
        assert!(err2.path.is_none());
    }

    #[test]
    fn test_or_path_keeps_existing_path() {
        let err = Error::missing_mandatory("a.b").or_path("c");
        assert_eq!(err.path, Some("a.b".into()));

        let err = Error::validation("", "bad").or_path("c");
        assert_eq!(err.path, Some("c".into()));
    }

    #[test]
    fn test_within_prefixes_relative_path() {
        let err = Error::validation("port", "bad").within("server");
        assert_eq!(err.path, Some("server.port".into()));

        let err = Error::validation("", "bad").within("server");
        assert_eq!(err.path, Some("server".into()));
    }

    #[test]
    fn test_type_coercion_error() {
        let err = Error::type_coercion("server.port", "integer", "string (\"abc\")");
        let display = format!("{}", err);

        assert!(display.contains("Type coercion failed"));
        assert!(display.contains("Path: server.port"));
        assert!(display.contains("Got: string (\"abc\")"));
    }

    #[test]
    fn test_with_help() {
        let err = Error::parse("bad input").with_help("Try fixing the syntax");
        assert!(err.to_string().contains("Help: Try fixing the syntax"));
    }

    #[test]
    fn test_is_kind() {
        assert!(Error::schema_definition("x").is(&ErrorKind::SchemaDefinition));
        assert!(!Error::internal("x").is(&ErrorKind::Parse));
    }
}
