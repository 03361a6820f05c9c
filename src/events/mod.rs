//! # Events Module
//!
//! The execution event pipeline around every executor invocation.
//!
//! ## States
//!
//! ```text
//! Created -> BeforeFired -> Canceled
//!                        -> Executing -> AfterFired -> Done
//! ```
//!
//! - **BeforeFired**: a [`BeforeExecutionEvent`] is delivered to every matching
//!   before-observer in registration order. The first observer to cancel supplies
//!   the substitute response and delivery stops; the executor never runs.
//! - **Executing**: method filters are applied, then the executor runs. Its value,
//!   its `Response` wrapper (unwrapped) or its error becomes the original entity.
//!   A rejected filter skips execution and fails the call with status 400.
//! - **AfterFired**: an [`AfterExecutionEvent`] goes to the success channel or, if
//!   the call failed, to the failure channel. Observers may rewrite entity, status
//!   and headers; the original entity stays fixed.
//!
//! Observer errors are configuration bugs: they abort the dispatch instead of
//! becoming part of the response.
//!
//! ## Subscriptions
//!
//! Observers subscribe to the [`EventBus`] with an [`EventSelector`] of
//! application, resource and method patterns, optionally restricted to methods
//! declaring a named interceptor.

mod bus;
mod pipeline;
mod types;

pub use bus::{EventBus, Listener};
pub use pipeline::{Pipeline, PipelineState, FAILURE_STATUS, FILTER_FAILURE_STATUS, SEE_OTHER_STATUS};
pub use types::{AfterExecutionEvent, BeforeExecutionEvent, Channel, EventSelector};
