//! # Metadata Module
//!
//! The application model: [`Application`] → [`Resource`] → [`ResourceMethod`] →
//! request/response variants, plus the filters and response headers a method
//! declares.
//!
//! ## Lifecycle
//!
//! 1. A declaration document (YAML or JSON) is deserialised into [`ApplicationDecl`]
//! 2. [`build_application`] validates it and compiles templates, media types and
//!    filter patterns; any failure is a fatal [`crate::error::MetadataError`]
//! 3. The resulting graph is shared read-only (`Arc`) for the process lifetime
//!
//! ## Example
//!
//! ```rust
//! use declarest::metadata::{load_application_from_str, Format};
//! use declarest::runtime_config::RuntimeConfig;
//!
//! let yaml = r#"
//! name: movies
//! base_path: /api
//! types:
//!   - name: Movie
//! resources:
//!   - name: Movie
//!     path: /movies/{id}
//!     methods:
//!       - name: GET
//!         responses:
//!           - type: Movie
//!             media_types: [application/json]
//! "#;
//! let app = load_application_from_str(yaml, Format::Yaml, &RuntimeConfig::default()).unwrap();
//! assert!(app.resource("Movie").unwrap().method("GET").is_some());
//! ```

mod build;
mod declare;
mod describe;
mod load;
mod types;
#[cfg(test)]
mod tests;

pub use build::build_application;
pub use declare::{
    ApplicationDecl, FilterDecl, HeaderDecl, MethodDecl, RequestDecl, ResourceDecl, ResponseDecl,
    TypeDecl,
};
pub use describe::{
    ApplicationDescriptor, FilterDescriptor, HeaderDescriptor, MethodDescriptor,
    ResourceDescriptor, VariantDescriptor,
};
pub use load::{load_application, load_application_from_str, parse_declaration, Format};
pub use types::{
    Application, Filter, HeaderKind, MethodRequest, MethodResponse, PayloadType, Resource,
    ResourceMethod, ResponseHeader, TransportGuarantee, TypeRegistry, ValueType, ANY_TYPE,
    FAILURE_TYPE, OPTIONS_METHOD,
};
