//! # declarest
//!
//! **declarest** is a metadata-driven dispatch core for REST-style applications.
//! Applications are *declared* (types, resources, methods, filters, headers and
//! media types) in a YAML or JSON document; the crate builds an immutable
//! metadata graph from that declaration and dispatches transport-independent
//! calls against it.
//!
//! ## Architecture
//!
//! - **[`media`]** - media type parsing, canonical rendering and compatibility
//! - **[`version`]** - versions, version ranges and best-match resolution
//! - **[`metadata`]** - declaration records, the built [`metadata::Application`] graph
//!   and its JSON descriptor
//! - **[`router`]** - URI templates and base-path-aware resource matching
//! - **[`codec`]** - entity reader/writer registry with content negotiation
//! - **[`dispatcher`]** - executor binding, the introspection (`OPTIONS`) executor
//!   and the [`dispatcher::Dispatcher`] entry point
//! - **[`events`]** - before/after execution events, observers and the call pipeline
//! - **[`middleware`]** - observers for security, error mapping, tracing and metrics
//! - **[`linter`]** - startup checks over a built application
//! - **[`cli`]** - the `declarest` command-line tool
//!
//! ### Call Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Binding as Transport binding
//!     participant Router
//!     participant Dispatcher
//!     participant Bus as EventBus
//!     participant Executor
//!
//!     Binding->>Router: route("/lib/books/7")
//!     Router-->>Binding: RouteMatch(Book, {id: 7})
//!     Binding->>Dispatcher: dispatch(Call)
//!     Dispatcher->>Dispatcher: select method, response and request variants
//!     Dispatcher->>Bus: before-execution observers
//!     alt canceled
//!         Bus-->>Dispatcher: response from observer
//!     end
//!     Dispatcher->>Dispatcher: evaluate filters
//!     Dispatcher->>Executor: execute(ExecutionContext)
//!     Executor-->>Dispatcher: Outcome or failure
//!     Dispatcher->>Bus: success or failure observers
//!     Dispatcher-->>Binding: Response
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use declarest::dispatcher::{Call, Dispatcher};
//! use declarest::metadata::load_application;
//! use declarest::runtime_config::RuntimeConfig;
//! use std::sync::Arc;
//!
//! let app = load_application("library.yaml", &RuntimeConfig::from_env()).expect("valid declaration");
//! let dispatcher = Dispatcher::new(Arc::new(app));
//! let response = dispatcher.dispatch(Call::new("Book", "GET").param("id", "7"));
//! ```
//!
//! ## Configuration
//!
//! Runtime behaviour is read from the environment by [`runtime_config::RuntimeConfig`]
//! (`DECLAREST_*` variables); logging by [`logging::LogConfig`].

pub mod cli;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod generators;
pub mod ids;
pub mod linter;
pub mod logging;
pub mod media;
pub mod metadata;
pub mod middleware;
pub mod pattern;
pub mod router;
pub mod runtime_config;
pub mod security;
pub mod version;

pub use dispatcher::{Call, Dispatcher, Response};
pub use error::{DispatchError, MetadataError, ResolutionError, ResponseException};
pub use media::MediaType;
pub use metadata::{load_application, Application};
pub use version::{Version, VersionRange};
