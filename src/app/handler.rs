//! Request handlers and the values they return.

use std::sync::Arc;

use serde::Serialize;

use crate::app::config::AppConfig;
use crate::app::error::Error;
use crate::app::request::{Environ, Request};
use crate::app::response::{Body, Response};
use crate::routing::Args;

/// What a handler asks the dispatcher to do with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send this body with the current status.
    Body(Body),
    /// Respond with this status; the error page fills in a missing body.
    Status(u16),
    /// Redirect to a location with a 3xx status.
    Redirect(u16, String),
}

impl Outcome {
    /// Serialize `value` as the JSON body of `response`.
    pub fn json<T: Serialize>(response: &mut Response, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_string(value)?;
        response.media_type = "application/json".to_string();
        Ok(Outcome::Body(Body::Text(json)))
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Outcome::Body(text.into())
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Outcome::Body(text.into())
    }
}

impl From<Vec<u8>> for Outcome {
    fn from(bytes: Vec<u8>) -> Self {
        Outcome::Body(bytes.into())
    }
}

impl From<Body> for Outcome {
    fn from(body: Body) -> Self {
        Outcome::Body(body)
    }
}

/// The per-request state a handler works with.
///
/// A fresh context is created for every request, so nothing set on the
/// response leaks into the next one.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub response: Response,
    /// Arguments extracted from the path by the matching route.
    pub args: Args,
}

impl Context {
    pub fn new(environ: Environ, config: &AppConfig) -> Self {
        Self {
            request: Request::new(environ),
            response: Response::new(config),
            args: Args::default(),
        }
    }
}

/// A route handler.
pub type HandlerFn = Arc<dyn Fn(&mut Context) -> Result<Outcome, Error> + Send + Sync>;

/// A handler producing the body of an error page.
pub type ErrorHandlerFn = Arc<dyn Fn(&mut Context) -> Result<Body, Error> + Send + Sync>;
