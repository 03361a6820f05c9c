//! # Version Module
//!
//! Three-part versions (`major.minor.release`) and interval expressions over them,
//! used to pick readers, writers and handlers bound to a particular content version.
//!
//! ## Range grammar
//!
//! ```text
//! [open] [version] ["," [version]] [close]
//! open  := "[" (inclusive) | "(" | "]" (exclusive)
//! close := "]" (inclusive) | ")" | "[" (exclusive)
//! ```
//!
//! An empty bound is unbounded. A bare version (`1.5`) is an exact range whose
//! bounds both equal that version.
//!
//! ## Precision
//!
//! A bound only constrains the components it spells out. An inclusive upper bound
//! of `2` admits `2.9999`; an exclusive upper bound of `2` stops before `2.0.0`.
//! Lower bounds fill missing components with zero.
//!
//! ```rust
//! use declarest::version::{Version, VersionRange};
//!
//! let range = VersionRange::parse("[1,2]").unwrap();
//! assert!(range.includes(&Version::parse("2.9999").unwrap()));
//! assert!(!VersionRange::parse("[1,2[").unwrap().includes(&Version::parse("2").unwrap()));
//! ```

mod core;
#[cfg(test)]
mod tests;

pub use core::{resolve_best, resolve_best_expr, Version, VersionRange};
