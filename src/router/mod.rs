//! # Router Module
//!
//! Path templates and URI → resource resolution.
//!
//! ## Templates
//!
//! A resource path such as `/movies/{id:[0-9]+}/cast/{name}` is compiled once into a
//! [`PathTemplate`]: each `{name}` or `{name:regex}` group becomes a capture (default
//! sub-pattern `[^/]+`), literal text is escaped, and a full-string match is
//! required. Group names must be unique within a template.
//!
//! Rendering substitutes values positionally and does not URL-encode them, so
//! `render(match(uri)) == uri` holds for every matching URI.
//!
//! ## Resolution
//!
//! [`Router`] strips the application base path and query string, then tries
//! templates from most to least literal text.
//!
//! ```rust
//! use declarest::router::PathTemplate;
//!
//! let t = PathTemplate::compile("/movies/{id:[0-9]+}").unwrap();
//! let params = t.match_path("/movies/42").unwrap();
//! assert_eq!(params[0].1, "42");
//! assert_eq!(t.render(["42"]).as_deref(), Some("/movies/42"));
//! ```

mod core;
mod template;
#[cfg(test)]
mod tests;

pub use core::{RouteMatch, Router};
pub use template::{ParamVec, PathTemplate, DEFAULT_GROUP_PATTERN, MAX_INLINE_PARAMS};
pub(crate) use template::strip_base;
