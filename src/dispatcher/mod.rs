//! # Dispatcher Module
//!
//! Resolves an inbound [`Call`] to a resource method and an [`Executor`], then
//! runs it through the [`crate::events`] pipeline.
//!
//! ## Overview
//!
//! The dispatcher is the heart of declarest's call handling. It:
//! - Checks the call against the declared metadata (resource, method, payload types)
//! - Builds a fresh [`ExecutionContext`] for every call
//! - Picks the executor whose binding matches the call
//! - Returns exactly one [`Response`] or one [`crate::error::DispatchError`]
//!
//! ## Executor Resolution
//!
//! Executors are registered with an [`ExecutorSpec`]: regex patterns over the
//! application, resource and method names plus the accepted payload types.
//! Bindings are tried in registration order and the first match wins. `OPTIONS`
//! falls through to the [`OptionsExecutor`]; anything left over is answered by
//! the default executor ([`NotImplementedExecutor`], status 501).
//!
//! ```rust,ignore
//! use declarest::dispatcher::{Call, Dispatcher, ExecutorSpec, Outcome};
//! use serde_json::json;
//!
//! let mut dispatcher = Dispatcher::new(app);
//! dispatcher.register_executor(
//!     ExecutorSpec::new("movies").resource("Movie").method("GET"),
//!     Arc::new(|ctx: &mut ExecutionContext| {
//!         let id = ctx.parameters().first("id").unwrap_or_default().to_string();
//!         Ok(Outcome::Entity(json!({ "id": id })))
//!     }),
//! )?;
//!
//! let response = dispatcher.dispatch(Call::new("Movie", "GET").param("id", "7"))?;
//! ```
//!
//! ## Error Handling
//!
//! - Executor errors become a failure entity with status 500 and go through the
//!   failure channel; they are part of the response, not a dispatch error
//! - A [`crate::error::ResponseException`] aborts the dispatch
//! - Calls that do not fit the metadata fail with a resolution error carrying
//!   the HTTP status to answer with

mod call;
mod context;
mod core;
mod executor;
mod options;
mod response;

pub use call::Call;
pub use context::{ExecutionContext, ParamValue, Parameters};
pub use core::{Dispatcher, ResolvedExecutor};
pub use executor::{
    Binding, CallTarget, Executor, ExecutorSpec, NotImplementedExecutor, Outcome, TypeMatch,
    DEFAULT_EXECUTOR_NAME,
};
pub use options::{OptionsExecutor, OPTIONS_EXECUTOR_NAME};
pub use response::{Entity, HeaderValue, HeaderValues, Headers, Response};
