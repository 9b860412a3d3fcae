//! Per-node flag overrides
//!
//! A node only stores its own explicit overrides; the effective value of a
//! flag is found by walking up the parent chain (see `Container::get_flag`).

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Flags recognized by config nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Forbid any mutation of the node and its descendants
    Readonly,
    /// Forbid adding keys that are not already present
    Struct,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Readonly => "readonly",
            Flag::Struct => "struct",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "readonly" => Ok(Flag::Readonly),
            "struct" => Ok(Flag::Struct),
            other => Err(Error::parse(format!("Unknown flag '{}'", other))
                .with_help("Known flags are 'readonly' and 'struct'")),
        }
    }
}

/// Explicit overrides held by one node; `None` means inherit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    readonly: Option<bool>,
    struct_mode: Option<bool>,
}

impl Flags {
    pub fn get(&self, flag: Flag) -> Option<bool> {
        match flag {
            Flag::Readonly => self.readonly,
            Flag::Struct => self.struct_mode,
        }
    }

    pub fn set(&mut self, flag: Flag, value: Option<bool>) {
        match flag {
            Flag::Readonly => self.readonly = value,
            Flag::Struct => self.struct_mode = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_names() {
        assert_eq!(Flag::Readonly.to_string(), "readonly");
        assert_eq!("struct".parse::<Flag>().unwrap(), Flag::Struct);
        assert!("frozen".parse::<Flag>().is_err());
    }

    #[test]
    fn test_flags_default_to_inherit() {
        let flags = Flags::default();
        assert_eq!(flags.get(Flag::Readonly), None);
        assert_eq!(flags.get(Flag::Struct), None);
    }

    #[test]
    fn test_flags_set_and_clear() {
        let mut flags = Flags::default();
        flags.set(Flag::Struct, Some(false));
        assert_eq!(flags.get(Flag::Struct), Some(false));
        assert_eq!(flags.get(Flag::Readonly), None);

        flags.set(Flag::Struct, None);
        assert_eq!(flags.get(Flag::Struct), None);
    }
}
