// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog mutation commands and field values
//!
//! The catalog is built exclusively from an ordered log of commands. Each
//! command has a canonical one-line text form:
//!
//! ```text
//! add /clusters[cluster] databases database
//! set /clusters[cluster]/databases[database]/tables[T] isreplicated false
//! ```

use super::error::{CatalogError, CatalogResult};
use std::fmt;
use std::str::FromStr;

/// Typed value stored in a catalog node field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// Absolute path of another catalog node
    Ref(String),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Str(_) => "string",
            FieldValue::Ref(_) => "reference",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ref_path(&self) -> Option<&str> {
        match self {
            FieldValue::Ref(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Ref(p) => write!(f, "{}", p),
            FieldValue::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\r' => write!(f, "\\r")?,
                        '\t' => write!(f, "\\t")?,
                        other => write!(f, "{}", other)?,
                    }
                }
                write!(f, "\"")
            }
        }
    }
}

impl FromStr for FieldValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" => Err("missing value".to_string()),
            "null" => Ok(FieldValue::Null),
            "true" => Ok(FieldValue::Bool(true)),
            "false" => Ok(FieldValue::Bool(false)),
            _ if s.starts_with('/') => Ok(FieldValue::Ref(s.to_string())),
            _ if s.starts_with('"') => unquote(s).map(FieldValue::Str),
            _ => s
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| format!("unrecognized value '{}'", s)),
        }
    }
}

fn unquote(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().skip(1);
    loop {
        match chars.next() {
            None => return Err("unterminated string literal".to_string()),
            Some('"') => break,
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => return Err(format!("invalid escape '\\{}'", other)),
                None => return Err("unterminated string literal".to_string()),
            },
            Some(c) => out.push(c),
        }
    }
    if chars.next().is_some() {
        return Err("trailing characters after string literal".to_string());
    }
    Ok(out)
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<u32> for FieldValue {
    fn from(i: u32) -> Self {
        FieldValue::Int(i64::from(i))
    }
}

impl From<usize> for FieldValue {
    fn from(i: usize) -> Self {
        FieldValue::Int(i as i64)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A single entry of the catalog mutation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    /// Create a child node named `name` in `collection` of the node at `parent`
    Add {
        parent: String,
        collection: String,
        name: String,
    },

    /// Assign a field of the node at `path`
    Set {
        path: String,
        field: String,
        value: FieldValue,
    },
}

impl CatalogCommand {
    pub fn add<P: Into<String>, C: Into<String>, N: Into<String>>(
        parent: P,
        collection: C,
        name: N,
    ) -> Self {
        CatalogCommand::Add {
            parent: parent.into(),
            collection: collection.into(),
            name: name.into(),
        }
    }

    pub fn set<P: Into<String>, F: Into<String>, V: Into<FieldValue>>(
        path: P,
        field: F,
        value: V,
    ) -> Self {
        CatalogCommand::Set {
            path: path.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parse one line of command text; `line` is used for error reporting
    pub fn parse_line(text: &str, line: usize) -> CatalogResult<Self> {
        let malformed = |message: String| CatalogError::MalformedCommand { line, message };
        let text = text.trim();

        let (verb, rest) = text
            .split_once(' ')
            .ok_or_else(|| malformed(format!("incomplete command '{}'", text)))?;

        match verb {
            "add" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                match parts.as_slice() {
                    [parent, collection, name] => {
                        Ok(CatalogCommand::add(*parent, *collection, *name))
                    }
                    _ => Err(malformed(format!(
                        "'add' expects <path> <collection> <name>, got '{}'",
                        rest
                    ))),
                }
            }
            "set" => {
                let mut parts = rest.trim_start().splitn(3, ' ');
                let path = parts.next().unwrap_or_default();
                let field = parts.next().unwrap_or_default();
                let value = parts.next().unwrap_or_default();
                if path.is_empty() || field.is_empty() {
                    return Err(malformed(format!(
                        "'set' expects <path> <field> <value>, got '{}'",
                        rest
                    )));
                }
                let value = value.parse::<FieldValue>().map_err(malformed)?;
                Ok(CatalogCommand::set(path, field, value))
            }
            other => Err(malformed(format!("unknown command '{}'", other))),
        }
    }
}

impl fmt::Display for CatalogCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogCommand::Add {
                parent,
                collection,
                name,
            } => write!(f, "add {} {} {}", parent, collection, name),
            CatalogCommand::Set { path, field, value } => {
                write!(f, "set {} {} {}", path, field, value)
            }
        }
    }
}

impl FromStr for CatalogCommand {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogCommand::parse_line(s, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_values_escape_and_unescape() {
        let value = FieldValue::Str("SELECT \"a\"\nFROM t\\x".to_string());
        let text = value.to_string();
        assert_eq!(text, "\"SELECT \\\"a\\\"\\nFROM t\\\\x\"");
        assert_eq!(text.parse::<FieldValue>().unwrap(), value);
    }

    #[test]
    fn test_scalar_and_reference_values() {
        assert_eq!("null".parse::<FieldValue>().unwrap(), FieldValue::Null);
        assert_eq!("true".parse::<FieldValue>().unwrap(), FieldValue::Bool(true));
        assert_eq!("-42".parse::<FieldValue>().unwrap(), FieldValue::Int(-42));
        assert_eq!(
            "/clusters[cluster]".parse::<FieldValue>().unwrap(),
            FieldValue::Ref("/clusters[cluster]".to_string())
        );
        assert!("maybe".parse::<FieldValue>().is_err());
        assert!("\"open".parse::<FieldValue>().is_err());
    }

    #[test]
    fn test_set_command_keeps_spaces_in_value() {
        let cmd = CatalogCommand::parse_line(
            "set /clusters[cluster] sqltext \"SELECT * FROM T\"",
            7,
        )
        .unwrap();
        assert_eq!(
            cmd,
            CatalogCommand::set("/clusters[cluster]", "sqltext", "SELECT * FROM T")
        );
        assert_eq!(
            cmd.to_string(),
            "set /clusters[cluster] sqltext \"SELECT * FROM T\""
        );
    }

    #[test]
    fn test_malformed_commands_report_line() {
        let err = CatalogCommand::parse_line("add / clusters", 3).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedCommand { line: 3, .. }));

        let err = CatalogCommand::parse_line("drop / clusters x", 9).unwrap_err();
        assert!(matches!(err, CatalogError::MalformedCommand { line: 9, .. }));
    }
}
