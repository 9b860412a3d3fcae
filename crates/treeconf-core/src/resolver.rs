//! Custom interpolation resolvers
//!
//! A reference with a prefix (`${env:HOME}`) is handed to the resolver
//! registered under that prefix. Lookup checks the registry attached to the
//! root of the tree first, then the process-wide registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{Error, Result};
use crate::value::Value;

// Global resolver registry shared by every tree
static GLOBAL_REGISTRY: OnceLock<RwLock<ResolverRegistry>> = OnceLock::new();

/// Get the global resolver registry.
///
/// This registry is lazily initialized with built-in resolvers.
pub fn global_registry() -> &'static RwLock<ResolverRegistry> {
    GLOBAL_REGISTRY.get_or_init(|| RwLock::new(ResolverRegistry::with_builtins()))
}

/// Register a resolver in the global registry.
///
/// # Arguments
/// * `resolver` - The resolver to register
/// * `force` - If true, overwrite any existing resolver with the same name.
///   If false, return an error if the name is already registered.
pub fn register_global(resolver: Arc<dyn Resolver>, force: bool) -> Result<()> {
    let mut registry = global_registry()
        .write()
        .expect("Global registry lock poisoned");
    registry.register_with_force(resolver, force)
}

/// Trait for resolver implementations
pub trait Resolver: Send + Sync {
    /// Resolve a reference
    ///
    /// # Arguments
    /// * `args` - Comma-separated arguments from the reference, trimmed
    fn resolve(&self, args: &[String]) -> Result<Value>;

    /// Get the name of this resolver (the interpolation prefix)
    fn name(&self) -> &str;
}

/// A simple function-based resolver
pub struct FnResolver<F>
where
    F: Fn(&[String]) -> Result<Value> + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnResolver<F>
where
    F: Fn(&[String]) -> Result<Value> + Send + Sync,
{
    /// Create a new function-based resolver
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Resolver for FnResolver<F>
where
    F: Fn(&[String]) -> Result<Value> + Send + Sync,
{
    fn resolve(&self, args: &[String]) -> Result<Value> {
        (self.func)(args)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of available resolvers
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Arc<dyn Resolver>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.resolvers.keys().collect();
        names.sort();
        f.debug_struct("ResolverRegistry")
            .field("resolvers", &names)
            .finish()
    }
}

impl ResolverRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard built-in resolvers (env)
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(FnResolver::new("env", env_resolver)));
        registry
    }

    /// Register a resolver, replacing any resolver with the same name
    pub fn register(&mut self, resolver: Arc<dyn Resolver>) {
        let name = resolver.name().to_string();
        if self.resolvers.insert(name.clone(), resolver).is_some() {
            log::debug!("Replaced resolver '{}'", name);
        }
    }

    /// Register a resolver with optional force overwrite.
    ///
    /// Returns an error if `force` is false and the name is already taken.
    pub fn register_with_force(&mut self, resolver: Arc<dyn Resolver>, force: bool) -> Result<()> {
        let name = resolver.name().to_string();
        if !force && self.resolvers.contains_key(&name) {
            return Err(Error::resolver(
                &name,
                format!("resolver '{}' is already registered", name),
            )
            .with_help("Pass force=true to override the existing resolver"));
        }
        self.register(resolver);
        Ok(())
    }

    /// Register a function as a resolver
    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&[String]) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnResolver::new(name, func)));
    }

    /// Get a resolver by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Resolver>> {
        self.resolvers.get(name)
    }

    /// Check if a resolver is registered
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Call the named resolver
    pub fn resolve(&self, name: &str, args: &[String]) -> Result<Value> {
        let resolver = self.resolvers.get(name).ok_or_else(|| {
            Error::unsupported_interpolation("", format!("Unsupported interpolation type {}", name))
        })?;
        log::trace!("Calling resolver '{}' with {:?}", name, args);
        resolver.resolve(args)
    }
}

/// Built-in environment variable resolver
///
/// Usage:
///   ${env:VAR_NAME}            - value of the variable, error if not set
///   ${env:VAR_NAME,default}    - value of the variable, or the default
///
/// The value (or default) is decoded, so `${env:PORT}` with `PORT=80` reads as an integer.
fn env_resolver(args: &[String]) -> Result<Value> {
    let var_name = match args.first() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(Error::resolver("env", "env resolver requires a variable name")),
    };

    match std::env::var(var_name) {
        Ok(value) => Ok(Value::decode_primitive(&value)),
        Err(_) => match args.get(1) {
            Some(default) => Ok(Value::decode_primitive(default)),
            None => Err(Error::key_not_found(
                "",
                format!("Environment variable '{}' not found", var_name),
            )
            .with_help(format!(
                "Set the {} environment variable or provide a default: ${{env:{},default}}",
                var_name, var_name
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_env_resolver_reads_variable() {
        std::env::set_var("TREECONF_TEST_PORT", "8080");
        let registry = ResolverRegistry::with_builtins();

        let value = registry
            .resolve("env", &["TREECONF_TEST_PORT".to_string()])
            .unwrap();
        assert_eq!(value, Value::Integer(8080));

        std::env::remove_var("TREECONF_TEST_PORT");
    }

    #[test]
    fn test_env_resolver_default() {
        std::env::remove_var("TREECONF_MISSING_VAR");
        let registry = ResolverRegistry::with_builtins();

        let value = registry
            .resolve(
                "env",
                &["TREECONF_MISSING_VAR".to_string(), "true".to_string()],
            )
            .unwrap();
        assert_eq!(value, Value::Bool(true));
    }

    #[test]
    fn test_env_resolver_missing() {
        std::env::remove_var("TREECONF_MISSING_VAR_2");
        let registry = ResolverRegistry::with_builtins();

        let err = registry
            .resolve("env", &["TREECONF_MISSING_VAR_2".to_string()])
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::KeyNotFound);
        assert!(err.to_string().contains("TREECONF_MISSING_VAR_2"));
    }

    #[test]
    fn test_unknown_resolver() {
        let registry = ResolverRegistry::new();
        let err = registry.resolve("nope", &[]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedInterpolationType);
    }

    #[test]
    fn test_register_fn() {
        let mut registry = ResolverRegistry::new();
        registry.register_fn("upper", |args| {
            Ok(Value::String(args.join(",").to_uppercase()))
        });

        assert!(registry.contains("upper"));
        assert_eq!(
            registry
                .resolve("upper", &["a".to_string(), "b".to_string()])
                .unwrap(),
            Value::String("A,B".into())
        );
    }

    #[test]
    fn test_register_with_force() {
        let mut registry = ResolverRegistry::with_builtins();
        let replacement = Arc::new(FnResolver::new("env", |_args: &[String]| {
            Ok(Value::String("fixed".into()))
        }));

        let err = registry
            .register_with_force(replacement.clone(), false)
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Resolver { .. }));

        registry.register_with_force(replacement, true).unwrap();
        assert_eq!(
            registry.resolve("env", &["X".to_string()]).unwrap(),
            Value::String("fixed".into())
        );
    }

    #[test]
    fn test_global_registry_has_builtins() {
        let registry = global_registry().read().unwrap();
        assert!(registry.contains("env"));
    }
}
