//! Value-kind classification for interpolation strings
//!
//! Recognizes:
//! - `???` - mandatory value not supplied yet
//! - `${path.to.value}` - reference into the same tree, resolved from the root
//! - `${resolver:arg1,arg2}` - call to a registered resolver
//! - `http://${host}:${port}/` - string with embedded references
//!
//! Classification is purely syntactic; resolution lives with the containers.

use regex::Regex;
use std::sync::OnceLock;

use crate::value::Value;

/// Sentinel for "mandatory value not yet supplied"
pub const MISSING: &str = "???";

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{(\w+:)?([\w.%_ \\,\-]*?)\}").expect("interpolation pattern is valid")
    })
}

/// One `${...}` reference found in a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpolationRef {
    /// Byte offset of the leading `$`
    pub start: usize,
    /// Byte offset one past the closing `}`
    pub end: usize,
    /// Resolver name, without the trailing colon
    pub prefix: Option<String>,
    /// Everything between the prefix and the closing brace
    pub key: String,
}

impl InterpolationRef {
    /// True for plain references into the tree (`${a.b}` or `${str:a.b}`)
    pub fn is_self_reference(&self) -> bool {
        matches!(self.prefix.as_deref(), None | Some("str"))
    }
}

/// What a raw string stored in a node means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// A literal value
    Value,
    /// The `???` sentinel
    MandatoryMissing,
    /// Exactly one reference and nothing else; the resolved value keeps its type
    Interpolation(InterpolationRef),
    /// References mixed with text; always resolves to a string
    StrInterpolation(Vec<InterpolationRef>),
}

impl ValueKind {
    pub fn is_interpolation(&self) -> bool {
        matches!(
            self,
            ValueKind::Interpolation(_) | ValueKind::StrInterpolation(_)
        )
    }
}

/// Classify a string
pub fn get_value_kind(value: &str) -> ValueKind {
    if value == MISSING {
        return ValueKind::MandatoryMissing;
    }

    let mut refs: Vec<InterpolationRef> = reference_pattern()
        .captures_iter(value)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(InterpolationRef {
                start: whole.start(),
                end: whole.end(),
                prefix: caps
                    .get(1)
                    .map(|m| m.as_str().trim_end_matches(':').to_string()),
                key: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            })
        })
        .collect();

    if refs.is_empty() {
        return ValueKind::Value;
    }
    if refs.len() == 1 && refs[0].start == 0 && refs[0].end == value.len() {
        return ValueKind::Interpolation(refs.swap_remove(0));
    }
    ValueKind::StrInterpolation(refs)
}

/// Classify a stored value; only strings can be anything but a literal
pub fn value_kind_of(value: &Value) -> ValueKind {
    match value {
        Value::String(s) => get_value_kind(s),
        _ => ValueKind::Value,
    }
}

/// Split resolver arguments on unescaped commas, trimming each one.
///
/// `\,` produces a literal comma inside an argument.
pub fn split_args(body: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => {
                args.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    args.push(current.trim().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_values() {
        assert_eq!(get_value_kind("10"), ValueKind::Value);
        assert_eq!(get_value_kind("hello world"), ValueKind::Value);
        assert_eq!(get_value_kind("$foo"), ValueKind::Value);
        assert_eq!(get_value_kind("${foo"), ValueKind::Value);
        assert_eq!(value_kind_of(&Value::Integer(3)), ValueKind::Value);
    }

    #[test]
    fn test_mandatory_missing() {
        assert_eq!(get_value_kind("???"), ValueKind::MandatoryMissing);
        assert_eq!(get_value_kind("????"), ValueKind::Value);
    }

    #[test]
    fn test_pure_interpolation() {
        match get_value_kind("${foo.bar}") {
            ValueKind::Interpolation(r) => {
                assert_eq!(r.prefix, None);
                assert_eq!(r.key, "foo.bar");
                assert!(r.is_self_reference());
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_prefixed_interpolation() {
        match get_value_kind("${env:HOME, fallback}") {
            ValueKind::Interpolation(r) => {
                assert_eq!(r.prefix.as_deref(), Some("env"));
                assert_eq!(r.key, "HOME, fallback");
                assert!(!r.is_self_reference());
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_str_interpolation() {
        match get_value_kind("ftp://${host}:${port}/path") {
            ValueKind::StrInterpolation(refs) => {
                assert_eq!(refs.len(), 2);
                assert_eq!(refs[0].key, "host");
                assert_eq!(refs[0].start, 6);
                assert_eq!(refs[1].key, "port");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_two_adjacent_references_are_str_interpolation() {
        assert!(matches!(
            get_value_kind("${a}${b}"),
            ValueKind::StrInterpolation(_)
        ));
    }

    #[test]
    fn test_illegal_characters_are_not_references() {
        assert_eq!(get_value_kind("${a/b}"), ValueKind::Value);
        assert_eq!(get_value_kind("${a:b:c}"), ValueKind::Value);
    }

    #[test]
    fn test_split_args() {
        assert_eq!(split_args("A"), vec!["A"]);
        assert_eq!(split_args(" A , b "), vec!["A", "b"]);
        assert_eq!(split_args("a\\,b,c"), vec!["a,b", "c"]);
        assert_eq!(split_args(""), vec![""]);
    }
}
