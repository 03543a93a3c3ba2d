//! Request context built from what the transport supplies.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::app::error::Error;
use crate::app::multi_dict::MultiDict;

/// The raw request data handed over by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct Environ {
    /// The request method name, e.g. `GET`.
    pub method: String,
    /// The request path without the query string.
    pub path: String,
    /// The raw query string, without the leading `?`.
    pub query_string: String,
    /// The request headers in the order received.
    pub headers: Vec<(String, String)>,
    /// The raw request body.
    pub body: Vec<u8>,
}

impl Environ {
    /// Create an environ for `method` and `target`, splitting any query
    /// string off the target.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method: method.into(),
            path: path.to_string(),
            query_string: query.to_string(),
            ..Self::default()
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value, ignoring the case of its name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Represents the current request.
#[derive(Debug, Clone)]
pub struct Request {
    /// The request method name.
    pub method: String,
    /// The request path; `/` when the transport supplied none.
    pub path: String,
    /// Query parameters.
    pub query: MultiDict,
    /// Form parameters from a URL-encoded body.
    pub form: MultiDict,
    /// Cookies; the last value wins for repeated names.
    pub cookies: HashMap<String, String>,
    /// The raw transport data.
    pub environ: Environ,
}

impl Request {
    /// Build the request context from transport data.
    pub fn new(environ: Environ) -> Self {
        let method = if environ.method.is_empty() {
            "GET".to_string()
        } else {
            environ.method.clone()
        };
        let path = if environ.path.is_empty() {
            "/".to_string()
        } else {
            environ.path.clone()
        };

        let query = parse_urlencoded(environ.query_string.as_bytes());
        let form = if carries_form(&method, &environ) {
            parse_urlencoded(form_body(&environ))
        } else {
            MultiDict::new()
        };
        let cookies = parse_cookies(&environ.headers);

        Self {
            method,
            path,
            query,
            form,
            cookies,
            environ,
        }
    }

    /// Get a header value.
    ///
    /// Headers are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.environ.header(name)
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Get a cookie value.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The raw request body.
    pub fn body(&self) -> &[u8] {
        &self.environ.body
    }

    /// Parse the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(self.body())?;
        Ok(json)
    }

    /// Check if the request has a JSON body.
    pub fn is_json(&self) -> bool {
        self.header("Content-Type")
            .is_some_and(|content_type| content_type.starts_with("application/json"))
    }
}

/// Decode `application/x-www-form-urlencoded` data, dropping blank values.
fn parse_urlencoded(input: &[u8]) -> MultiDict {
    url::form_urlencoded::parse(input)
        .filter(|(_, v)| !v.is_empty())
        .collect()
}

fn carries_form(method: &str, environ: &Environ) -> bool {
    if method == "GET" || method == "HEAD" {
        return false;
    }
    match environ.header("Content-Type") {
        Some(content_type) => content_type
            .split(';')
            .next()
            .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded")),
        None => true,
    }
}

/// The body, truncated to `Content-Length` when that is shorter.
fn form_body(environ: &Environ) -> &[u8] {
    let limit = environ
        .header("Content-Length")
        .and_then(|n| n.trim().parse::<usize>().ok())
        .unwrap_or(environ.body.len());
    &environ.body[..limit.min(environ.body.len())]
}

/// Parse every `Cookie` header; later values replace earlier ones.
fn parse_cookies(headers: &[(String, String)]) -> HashMap<String, String> {
    headers
        .iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case("Cookie"))
        .flat_map(|(_, v)| v.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
