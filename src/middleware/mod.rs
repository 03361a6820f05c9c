//! # Middleware Module
//!
//! Built-in observers for the execution event pipeline.
//!
//! A [`Middleware`] bundles hooks for all three channels and is attached with
//! [`crate::dispatcher::Dispatcher::add_middleware`] under an
//! [`crate::events::EventSelector`]. Middlewares run in attachment order.
//!
//! - [`SecurityMiddleware`]: role and transport checks, cancels with 403
//! - [`ErrorMappingMiddleware`]: JSON problem bodies for failures
//! - [`TracingMiddleware`]: per-call log lines, status and latency on the dispatch span
//! - [`MetricsMiddleware`]: call, failure and cancellation counters
//!
//! ```rust,ignore
//! use declarest::events::EventSelector;
//! use declarest::middleware::{SecurityMiddleware, TracingMiddleware};
//!
//! dispatcher.add_middleware("tracing", EventSelector::all(), Arc::new(TracingMiddleware))?;
//! dispatcher.add_middleware("security", EventSelector::all(), Arc::new(SecurityMiddleware))?;
//! ```

mod core;
mod error_mapping;
mod metrics;
mod security;
mod tracing;

pub use core::Middleware;
pub use error_mapping::ErrorMappingMiddleware;
pub use metrics::MetricsMiddleware;
pub use security::{SecurityMiddleware, FORBIDDEN_STATUS};
pub use self::tracing::TracingMiddleware;
