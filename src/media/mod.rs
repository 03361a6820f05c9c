//! # Media Type Module
//!
//! Parses and compares MIME-type expressions as they appear in `Content-Type`
//! and `Accept` headers and in resource declarations.
//!
//! ## Grammar
//!
//! ```text
//! category "/" [space ("." | "-")] subtype ["." "v" version] ["+" alttype] [";" params]
//! ```
//!
//! - `category` is one of `*`, `text`, `application`, `image`, `message`, `audio`,
//!   `model`, `multipart`, `video`
//! - `space` is a vendor tree: `vnd`, `prs` or `x`
//! - `version` is an embedded resource version such as `1.2`
//! - `alttype` is a structured-syntax suffix such as `json` or `xml`
//! - only the `charset` parameter is retained (default `UTF-8`); others such as
//!   `q` are accepted and dropped
//!
//! ## Compatibility
//!
//! Two media types are compatible when their subtypes are equal (ignoring case),
//! when either subtype is `*`, or when one side's alternative subtype equals the
//! other side's subtype. `application/vnd.movie.v1+json` is therefore compatible
//! with `application/json`.
//!
//! ```rust
//! use declarest::media::MediaType;
//!
//! let versioned = MediaType::parse("application/vnd.movie.v1.2+json").unwrap();
//! assert_eq!(versioned.subtype(), "movie");
//! assert_eq!(versioned.version_expr(), Some("1.2"));
//! assert!(versioned.is_compatible(&MediaType::parse("application/json").unwrap()));
//! ```

mod core;

pub use core::{MediaType, DEFAULT_CHARSET};
