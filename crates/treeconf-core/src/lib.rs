//! treeconf-core: hierarchical configuration trees
//!
//! A config is a tree of mappings ([`DictConfig`]) and sequences
//! ([`ListConfig`]) whose leaves are typed scalar nodes ([`ValueNode`]).
//! Values may reference other values (`${a.b}`), embed references in text
//! (`"http://${host}:${port}"`), call resolvers (`${env:HOME}`), or be
//! marked as mandatory-but-missing (`???`). References are resolved on read.
//!
//! # Example
//!
//! ```rust
//! use treeconf_core::{Container, DictConfig, Value};
//!
//! let yaml = r#"
//! server:
//!   host: localhost
//!   port: 8080
//! url: "http://${server.host}:${server.port}"
//! "#;
//!
//! let cfg = DictConfig::from_yaml(yaml).unwrap();
//! assert_eq!(cfg.get_str("url").unwrap(), "http://localhost:8080");
//!
//! cfg.set_readonly(Some(true));
//! assert!(cfg.set("url", "other").is_err());
//! assert_eq!(cfg.select("server.port").unwrap().unwrap(), Value::Integer(8080));
//! ```

pub mod container;
pub mod dictconfig;
pub mod error;
pub mod flags;
pub mod interpolation;
pub mod listconfig;
pub mod node;
pub mod nodes;
pub mod resolver;
pub mod schema;
pub mod value;

mod config;

pub use config::Config;
pub use container::{Container, FlagGuard};
pub use dictconfig::DictConfig;
pub use error::{Error, ErrorKind, Result};
pub use flags::Flag;
pub use interpolation::MISSING;
pub use listconfig::ListConfig;
pub use node::{Input, Node, NodeKey, Resolved};
pub use nodes::{ValueNode, ValueType};
pub use resolver::{register_global, FnResolver, Resolver, ResolverRegistry};
pub use schema::{Field, FieldType, FieldValue, StructuredObject, StructuredType};
pub use value::{EnumType, EnumValue, Value};
