//! Error types for request dispatch.

use thiserror::Error;

use crate::routing::Error as RouteError;

/// Errors that can occur while setting up or dispatching requests.
///
/// A request that matches no route is not an error; it becomes a 404 or
/// 501 response. Everything here is raised to the caller of
/// [`Application::handle`](crate::app::Application::handle).
#[derive(Debug, Error)]
pub enum Error {
    /// A route pattern failed to compile.
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// A handler returned a value outside the documented shapes.
    #[error("Handler contract violation: {0}")]
    HandlerContract(String),

    /// The application was asked to do something it cannot decide.
    #[error("Logic error: {0}")]
    Logic(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required request header is missing.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A failure raised by a user handler.
    #[error("Handler error: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary handler failure.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Handler(err.into())
    }
}
