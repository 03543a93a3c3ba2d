//! Single `<name:type>` wildcard definitions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::error::Error;

/// Identifiers, `!` or the empty string.
static NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z_]\w*|!|)$").expect("wildcard name regex should be valid")
});

/// The type tag of a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardType {
    /// One or more characters other than `/`.
    Str,
    /// One or more characters, `/` included.
    Path,
    /// Zero or a non-negative integer without leading zeros or sign.
    Int,
    /// A positive integer without leading zeros or sign.
    PositiveInt,
    /// Zero or an integer with an optional leading minus sign.
    NegativeInt,
}

impl WildcardType {
    /// The capturing pattern that matches values of this type.
    pub fn pattern(self) -> &'static str {
        match self {
            WildcardType::Str => "([^/]+)",
            WildcardType::Path => "(.+)",
            WildcardType::Int => "(0|[1-9][0-9]*)",
            WildcardType::PositiveInt => "([1-9][0-9]*)",
            WildcardType::NegativeInt => "(0|-?[1-9][0-9]*)",
        }
    }

    fn is_numeric(self) -> bool {
        !matches!(self, WildcardType::Str | WildcardType::Path)
    }
}

impl FromStr for WildcardType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "str" => Ok(WildcardType::Str),
            "path" => Ok(WildcardType::Path),
            "int" => Ok(WildcardType::Int),
            "+int" => Ok(WildcardType::PositiveInt),
            "-int" => Ok(WildcardType::NegativeInt),
            _ => Err(()),
        }
    }
}

impl fmt::Display for WildcardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            WildcardType::Str => "str",
            WildcardType::Path => "path",
            WildcardType::Int => "int",
            WildcardType::PositiveInt => "+int",
            WildcardType::NegativeInt => "-int",
        };
        f.write_str(tag)
    }
}

/// A value extracted from a matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text captured by a `str` or `path` wildcard or a regex group.
    Str(String),
    /// Integer captured by one of the integer wildcards.
    Int(i64),
    /// A regex group that did not take part in the match.
    Unset,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Unset => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

/// Arguments extracted by a successful route match.
///
/// Positional and named arguments are disjoint: anonymous wildcards and
/// unnamed regex groups land in `positional`, named ones in `named`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// Anonymous captures in left-to-right order.
    pub positional: Vec<Value>,
    /// Named captures.
    pub named: HashMap<String, Value>,
}

impl Args {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument called `name`.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }
}

/// How a wildcard's capture is delivered to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// `<>` style: appended to the positional arguments.
    Anonymous,
    /// `<!>` style: matched and discarded.
    Throwaway,
    /// `<name>` style: stored in the named arguments.
    Named(String),
}

/// A single wildcard definition in a wildcard route's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    binding: Binding,
    kind: WildcardType,
}

impl Wildcard {
    /// Parse an angle-bracket delimited specification such as `<id:int>`.
    ///
    /// The type defaults to `str` when it is missing or empty. Invalid
    /// names and types are rejected here so that a broken route never
    /// reaches the route table.
    pub fn parse(spec: &str) -> Result<Self, Error> {
        let inner = spec
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(|| Error::InvalidWildcardName {
                name: spec.to_string(),
                spec: spec.to_string(),
            })?;
        let (name, kind) = inner.split_once(':').unwrap_or((inner, ""));

        if !NAME_REGEX.is_match(name) {
            return Err(Error::InvalidWildcardName {
                name: name.to_string(),
                spec: spec.to_string(),
            });
        }
        let kind = kind.parse().map_err(|()| Error::InvalidWildcardType {
            kind: kind.to_string(),
            spec: spec.to_string(),
        })?;

        let binding = match name {
            "" => Binding::Anonymous,
            "!" => Binding::Throwaway,
            _ => Binding::Named(name.to_string()),
        };
        Ok(Self { binding, kind })
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn kind(&self) -> WildcardType {
        self.kind
    }

    /// The capturing pattern this wildcard contributes to its route.
    pub fn pattern(&self) -> &'static str {
        self.kind.pattern()
    }

    /// Convert captured text to a typed value.
    ///
    /// The text must come from a match of [`Wildcard::pattern`]; it is
    /// not validated again. Integers too large for `i64` yield `None`.
    pub fn value(&self, text: &str) -> Option<Value> {
        if self.kind.is_numeric() {
            text.parse().ok().map(Value::Int)
        } else {
            Some(Value::Str(text.to_string()))
        }
    }
}
