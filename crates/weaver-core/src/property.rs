//! Typed property paths
//!
//! A `PropertyPath` is a small accessor expression addressing a value inside
//! the runtime property tree of a produced step object: dot-separated field
//! segments with optional `['key']` or `[index]` indexers, e.g.
//! `properties.Outputs['processed_data'].S3Uri`. Paths are parsed once into
//! typed segments and evaluated by a generic tree-walker, so no stringly
//! traversal logic leaks into the resolution core.

use crate::error::{CoreError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// One segment of a property path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Attribute access: `.name`
    Field(String),
    /// String-keyed lookup: `['key']`
    Key(String),
    /// Numeric index: `[0]`
    Index(usize),
}

/// A parsed accessor expression into a step's runtime property tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Parse a path from its textual form
    pub fn parse(input: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut chars = input.chars().peekable();

        if input.is_empty() {
            return Err(CoreError::InvalidPropertyPath("empty path".to_string()));
        }

        loop {
            // A segment starts with an identifier
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            if ident.is_empty() {
                return Err(CoreError::InvalidPropertyPath(format!(
                    "expected identifier in '{}'",
                    input
                )));
            }
            segments.push(PathSegment::Field(ident));

            // Optional indexers: ['key'] or [digits]
            while chars.peek() == Some(&'[') {
                chars.next();
                match chars.peek() {
                    Some('\'') => {
                        chars.next();
                        let mut key = String::new();
                        loop {
                            match chars.next() {
                                Some('\'') => break,
                                Some(c) => key.push(c),
                                None => {
                                    return Err(CoreError::InvalidPropertyPath(format!(
                                        "unterminated key in '{}'",
                                        input
                                    )))
                                }
                            }
                        }
                        if chars.next() != Some(']') {
                            return Err(CoreError::InvalidPropertyPath(format!(
                                "expected ']' after key in '{}'",
                                input
                            )));
                        }
                        segments.push(PathSegment::Key(key));
                    }
                    Some(c) if c.is_ascii_digit() => {
                        let mut digits = String::new();
                        while let Some(&c) = chars.peek() {
                            if c.is_ascii_digit() {
                                digits.push(c);
                                chars.next();
                            } else {
                                break;
                            }
                        }
                        if chars.next() != Some(']') {
                            return Err(CoreError::InvalidPropertyPath(format!(
                                "expected ']' after index in '{}'",
                                input
                            )));
                        }
                        let index = digits.parse().map_err(|_| {
                            CoreError::InvalidPropertyPath(format!("invalid index in '{}'", input))
                        })?;
                        segments.push(PathSegment::Index(index));
                    }
                    _ => {
                        return Err(CoreError::InvalidPropertyPath(format!(
                            "expected quoted key or index in '{}'",
                            input
                        )))
                    }
                }
            }

            match chars.next() {
                None => break,
                Some('.') => continue,
                Some(c) => {
                    return Err(CoreError::InvalidPropertyPath(format!(
                        "unexpected character '{}' in '{}'",
                        c, input
                    )))
                }
            }
        }

        Ok(Self { segments })
    }

    /// The parsed segments in evaluation order
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walk this path through a JSON property tree
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Field(name) => current.get(name.as_str())?,
                PathSegment::Key(key) => current.get(key.as_str())?,
                PathSegment::Index(i) => current.get(*i)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathSegment::Key(key) => write!(f, "['{}']", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        PropertyPath::parse(&text).map_err(D::Error::custom)
    }
}

/// Runtime property surface that collaborator step objects implement
///
/// The assembler never reaches into step internals; it asks for the property
/// tree and walks declared paths through it.
pub trait PropertyBag {
    /// Root of the step's declared runtime property tree, if it exposes one
    fn property_root(&self) -> Option<Value>;
}
