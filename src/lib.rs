//! A minimal web toolkit.
//!
//! This library maps HTTP requests to handler functions and turns what the
//! handlers return into responses. It does not talk to the network: a
//! transport hands over an [`Environ`] and writes out the
//! [`ResponseParts`] it gets back.
//!
//! # Features
//!
//! - Literal routes such as `/about`
//! - Wildcard routes such as `/notes/<:path>/<id:int>`
//! - Regular expression routes such as `/(?P<user>[^/]+)/(.*)`
//! - Query, form and cookie parsing
//! - Custom error pages per status code
//! - Static file serving with path traversal protection, and downloads
//! - JSON request and response bodies
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```
//! use microweb_rs::{Application, Environ};
//!
//! let mut app = Application::new();
//! app.get("/", |_| Ok("<p>Hello</p>".into())).unwrap();
//! app.get("/notes/<:path>/<id:int>", |ctx| {
//!     Ok(format!("{} #{}", ctx.args.positional[0], ctx.args.named["id"]).into())
//! })
//! .unwrap();
//!
//! let response = app.handle(Environ::new("GET", "/notes/tech/rust/12")).unwrap();
//! assert_eq!(response.status_line, "200 OK");
//! assert_eq!(response.body, b"tech/rust #12");
//!
//! let response = app.handle(Environ::new("GET", "/missing")).unwrap();
//! assert_eq!(response.status, 404);
//! ```
//!
//! ## Error pages and redirects
//!
//! ```
//! use microweb_rs::{Application, Environ, Outcome};
//!
//! let mut app = Application::new();
//! app.get("/private", |_| Ok(Outcome::Status(403))).unwrap();
//! app.get("/old", |_| Ok(Outcome::Redirect(301, "/new".to_string()))).unwrap();
//! app.error(403, |_| Ok("<p>Keep out</p>".into()));
//!
//! let response = app.handle(Environ::new("GET", "/private")).unwrap();
//! assert_eq!(response.status, 403);
//! assert_eq!(response.body, b"<p>Keep out</p>");
//!
//! let response = app.handle(Environ::new("GET", "/old")).unwrap();
//! assert_eq!(response.header("Location"), Some("/new"));
//! ```
//!
//! ## JSON support
//!
//! ```
//! use microweb_rs::{Application, Environ, Outcome};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let mut app = Application::new();
//! app.post("/users", |ctx| {
//!     let user: User = ctx.request.json()?;
//!     Outcome::json(&mut ctx.response, &user)
//! })
//! .unwrap();
//!
//! let environ = Environ::new("POST", "/users")
//!     .with_header("Content-Type", "application/json")
//!     .with_body(r#"{"name": "John Doe"}"#);
//! let response = app.handle(environ).unwrap();
//! assert_eq!(response.header("Content-Type"), Some("application/json; charset=UTF-8"));
//! assert_eq!(response.body, br#"{"name":"John Doe"}"#);
//! ```

// Export the routing module
pub mod routing;

// Export the application module
pub mod app;

// Re-export commonly used items for convenience
pub use app::{
    cube, AppConfig, Application, Body, Context, Environ, Error, Outcome, Request, Response,
    ResponseParts, StatusCode,
};
pub use routing::{Args, Error as RouteError, Method, Router, Value};
