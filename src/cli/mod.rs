//! # CLI Module
//!
//! Command-line access to a declaration file without writing any executor code.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Print one line per method, or the full descriptor as JSON:
//!
//! ```bash
//! declarest inspect --file library.yaml
//! declarest inspect --file library.yaml --json
//! ```
//!
//! ### `lint`
//!
//! Check codec coverage and generator names against the built-in registries:
//!
//! ```bash
//! declarest lint --file library.yaml --fail-on-warning
//! ```
//!
//! ### `match`
//!
//! Resolve a URI to its resource and path parameters:
//!
//! ```bash
//! declarest match --file library.yaml --uri /lib/books/7 --method GET
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use declarest::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let ok = run_cli(&Cli::parse(), &mut std::io::stdout())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
