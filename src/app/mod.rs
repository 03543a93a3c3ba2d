//! Application layer: request and response contexts and dispatch.
//!
//! The transport hands an [`Environ`] to [`Application::handle`], which
//! resolves a route, runs its handler and returns [`ResponseParts`] for
//! the transport to write out.

mod application;
mod config;
mod cube;
mod error;
mod handler;
mod multi_dict;
mod request;
mod response;
mod static_files;
mod status;
mod tests;

// Re-export public items
pub use application::Application;
pub use config::AppConfig;
pub use cube::cube;
pub use error::Error;
pub use handler::{Context, ErrorHandlerFn, HandlerFn, Outcome};
pub use multi_dict::MultiDict;
pub use request::{Environ, Request};
pub use response::{Body, CookieAttributes, Response, ResponseParts};
pub use static_files::{guess_media_type, DownloadOptions, StaticOptions};
pub use status::StatusCode;
