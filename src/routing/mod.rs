//! Request routing.
//!
//! Patterns are classified into one of three tiers: literal paths,
//! wildcard patterns such as `/notes/<:path>/<id:int>`, and regular
//! expressions such as `/(?P<user>[^/]+)/(.*)`. The [`Router`] resolves a
//! method and path to a handler plus the positional and named arguments
//! extracted from the path.

mod error;
mod method;
mod regex_route;
mod router;
mod wildcard;
mod wildcard_route;

// Re-export public items
pub use error::Error;
pub use method::Method;
pub use regex_route::RegexRoute;
pub use router::{PatternKind, Resolution, Router};
pub use wildcard::{Args, Binding, Value, Wildcard, WildcardType};
pub use wildcard_route::WildcardRoute;
