//! Response context and the descriptor handed back to the transport.

use std::fmt::Write;

use crate::app::config::AppConfig;
use crate::app::status::StatusCode;

/// A response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Body::Text(text) => text.into_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

/// Attributes of a `Set-Cookie` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieAttributes {
    pub expires: Option<String>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub max_age: Option<u64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<String>,
}

/// Everything the transport needs to write the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParts {
    pub status: u16,
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ResponseParts {
    /// Get the first header called `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Represents the response being built for the current request.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The media type, without parameters.
    pub media_type: String,
    /// The charset parameter of the `Content-Type` header, if any.
    pub charset: Option<String>,
    /// The headers, in insertion order. Duplicates are allowed.
    pub headers: Vec<(String, String)>,
    /// The response body, once something has set it.
    pub body: Option<Body>,
    /// Basename of the file named by the last static-file request.
    pub last_served_filename: Option<String>,
}

impl Response {
    /// Create a `200 OK` response seeded from the configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            status: StatusCode::OK,
            media_type: config.default_media_type.clone(),
            charset: Some(config.default_charset.clone()),
            headers: Vec::new(),
            body: None,
            last_served_filename: None,
        }
    }

    /// Add a header. Existing headers with the same name are kept.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Add a `Set-Cookie` header.
    pub fn set_cookie(&mut self, name: &str, value: &str, attrs: &CookieAttributes) {
        let mut cookie = format!("{name}={}", quote_cookie_value(value));
        if let Some(expires) = &attrs.expires {
            let _ = write!(cookie, "; expires={expires}");
        }
        if let Some(path) = &attrs.path {
            let _ = write!(cookie, "; Path={path}");
        }
        if let Some(domain) = &attrs.domain {
            let _ = write!(cookie, "; Domain={domain}");
        }
        if let Some(max_age) = attrs.max_age {
            let _ = write!(cookie, "; Max-Age={max_age}");
        }
        if attrs.secure {
            cookie.push_str("; Secure");
        }
        if attrs.http_only {
            cookie.push_str("; HttpOnly");
        }
        if let Some(same_site) = &attrs.same_site {
            let _ = write!(cookie, "; SameSite={same_site}");
        }
        self.add_header("Set-Cookie", cookie);
    }

    /// The status line, e.g. `404 Not Found`.
    pub fn status_line(&self) -> String {
        self.status.to_string()
    }

    /// A description of the current status.
    pub fn status_detail(&self) -> &'static str {
        self.status.detail()
    }

    /// Value of the `Content-Type` header.
    pub fn content_type(&self) -> String {
        match &self.charset {
            Some(charset) => format!("{}; charset={charset}", self.media_type),
            None => self.media_type.clone(),
        }
    }

    /// Close the response: append `Content-Type` and `Content-Length`
    /// and hand back the parts for the transport.
    pub fn finish(mut self) -> ResponseParts {
        let body = self.body.take().map(Body::into_bytes).unwrap_or_default();
        let content_type = self.content_type();
        self.add_header("Content-Type", content_type);
        self.add_header("Content-Length", body.len().to_string());

        ResponseParts {
            status: self.status.as_u16(),
            status_line: self.status_line(),
            headers: self.headers,
            body,
        }
    }
}

fn is_cookie_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~:".contains(c)
}

/// Quote a cookie value unless it only has token characters.
fn quote_cookie_value(value: &str) -> String {
    if value.chars().all(is_cookie_token_char) {
        return value.to_string();
    }
    let mut quoted = String::from("\"");
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_ascii_graphic() || c == ' ' => {
                if c == ',' || c == ';' {
                    let _ = write!(quoted, "\\{:03o}", c as u32);
                } else {
                    quoted.push(c);
                }
            }
            c => {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(quoted, "\\{byte:03o}");
                }
            }
        }
    }
    quoted.push('"');
    quoted
}
