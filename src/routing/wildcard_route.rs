//! Routes whose patterns contain `<name:type>` wildcards.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::error::Error;
use crate::routing::wildcard::{Args, Binding, Wildcard};

/// Something that looks like a wildcard token.
static WILDCARD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^<>/]*>").expect("wildcard regex should be valid"));

/// Wildcard tokens, literal runs, separators and stray angle brackets.
static TOKENIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^<>/]*>|[^<>/]+|/|<|>").expect("tokenizer regex should be valid")
});

/// A compiled wildcard route bound to its handler.
#[derive(Debug, Clone)]
pub struct WildcardRoute<H> {
    regex: Regex,
    wildcards: Vec<Wildcard>,
    handler: H,
}

impl<H> WildcardRoute<H> {
    /// Compile `pattern` into an anchored matcher.
    ///
    /// Literal segments are escaped, so regex metacharacters in the
    /// pattern only ever match themselves.
    pub fn new(pattern: &str, handler: H) -> Result<Self, Error> {
        let mut source = String::from("^");
        let mut wildcards = Vec::new();

        for token in Self::tokens(pattern) {
            if token.len() >= 2 && token.starts_with('<') && token.ends_with('>') {
                let wildcard = Wildcard::parse(token)?;
                source.push_str(wildcard.pattern());
                wildcards.push(wildcard);
            } else {
                source.push_str(&regex::escape(token));
            }
        }
        source.push('$');

        let regex = Regex::new(&source).map_err(|source| Error::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            regex,
            wildcards,
            handler,
        })
    }

    /// Match `path` against this route and extract its arguments.
    pub fn matches(&self, path: &str) -> Option<(&H, Args)> {
        let captures = self.regex.captures(path)?;
        let mut args = Args::default();

        for (i, wildcard) in self.wildcards.iter().enumerate() {
            if *wildcard.binding() == Binding::Throwaway {
                continue;
            }
            let text = captures.get(i + 1)?.as_str();
            let value = wildcard.value(text)?;
            match wildcard.binding() {
                Binding::Anonymous => args.positional.push(value),
                Binding::Named(name) => {
                    args.named.insert(name.clone(), value);
                }
                Binding::Throwaway => {}
            }
        }

        Some((&self.handler, args))
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Whether `pattern` contains something that looks like a wildcard.
    pub fn like(pattern: &str) -> bool {
        WILDCARD_REGEX.is_match(pattern)
    }

    /// Split `pattern` into wildcard tokens, literal runs and separators.
    pub fn tokens(pattern: &str) -> Vec<&str> {
        TOKENIZE_REGEX
            .find_iter(pattern)
            .map(|m| m.as_str())
            .collect()
    }
}
