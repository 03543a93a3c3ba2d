//! Routes expressed directly as regular expressions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::error::Error;
use crate::routing::wildcard::{Args, Value};

/// A parenthesised group somewhere in the pattern.
static GROUP_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*\)").expect("group regex should be valid"));

/// A compiled regex route bound to its handler.
#[derive(Debug, Clone)]
pub struct RegexRoute<H> {
    regex: Regex,
    handler: H,
}

impl<H> RegexRoute<H> {
    /// Compile `pattern` as-is. No anchors are added.
    pub fn new(pattern: &str, handler: H) -> Result<Self, Error> {
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex, handler })
    }

    /// Search `path` for this route's pattern and extract its groups.
    ///
    /// Unnamed groups become positional arguments in group order, named
    /// groups become named arguments.
    pub fn matches(&self, path: &str) -> Option<(&H, Args)> {
        let captures = self.regex.captures(path)?;
        let mut args = Args::default();

        for (i, name) in self.regex.capture_names().enumerate().skip(1) {
            let value = captures
                .get(i)
                .map_or(Value::Unset, |m| Value::Str(m.as_str().to_string()));
            match name {
                Some(name) => {
                    args.named.insert(name.to_string(), value);
                }
                None => args.positional.push(value),
            }
        }

        Some((&self.handler, args))
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Whether `pattern` looks like a regex, i.e. contains a group.
    pub fn like(pattern: &str) -> bool {
        GROUP_REGEX.is_match(pattern)
    }
}
