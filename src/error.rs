//! # Error Taxonomy
//!
//! Errors are split by *when* they happen and *who* must react:
//!
//! - [`MetadataError`] - discovery-time, fatal. Malformed declarations abort startup.
//! - [`ResolutionError`] - per-call, recoverable. The binding layer maps it to a status.
//! - [`ResponseException`] - per-call, fatal for that call. Propagates out of dispatch.
//! - [`DispatchError`] - what [`crate::dispatcher::Dispatcher::dispatch`] can return.
//!
//! Failures raised by resource-method executors are *not* errors at this level: they
//! become the response entity and flow through the failure event channel.

use thiserror::Error;

/// A media type string could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid media type '{input}': {reason}")]
pub struct MediaTypeParseError {
    pub input: String,
    pub reason: &'static str,
}

/// A version or version-range expression could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version expression '{input}': {reason}")]
pub struct VersionParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Malformed declarations detected while building the metadata graph.
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error(transparent)]
    MediaType(#[from] MediaTypeParseError),

    #[error(transparent)]
    Version(#[from] VersionParseError),

    #[error("invalid path template '{template}': {reason}")]
    Template { template: String, reason: String },

    #[error("invalid pattern '{pattern}' on {location}: {source}")]
    Pattern {
        location: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate {kind} '{name}' in {owner}")]
    Duplicate {
        kind: &'static str,
        name: String,
        owner: String,
    },

    #[error("method {method} on resource '{resource}' declares no response")]
    MissingResponse { resource: String, method: String },

    #[error("unknown payload type '{name}' referenced by {location}")]
    UnknownType { name: String, location: String },

    #[error("{location}: {message}")]
    Invalid { location: String, message: String },
}

/// Per-call resolution failures surfaced to the binding layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No reader/writer handles the payload type and media type.
    #[error("no {kind} for type '{payload_type}' and media type '{media_type}'")]
    MediaTypeNotSupported {
        kind: &'static str,
        payload_type: String,
        media_type: String,
    },

    /// More than one reader/writer qualifies; candidates are listed in registration order.
    #[error("ambiguous {kind} for type '{payload_type}' and media type '{media_type}': {candidates:?}")]
    MediaTypeAmbiguous {
        kind: &'static str,
        payload_type: String,
        media_type: String,
        candidates: Vec<String>,
    },

    /// The URI does not fit any resource template.
    #[error("path '{path}' does not match any resource")]
    PathNotMatched { path: String },

    /// The call is addressed to an application this dispatcher does not serve.
    #[error("application '{application}' is not served here")]
    ApplicationNotFound { application: String },

    #[error("resource '{resource}' is not declared")]
    ResourceNotFound { resource: String },

    #[error("method {method} is not declared on resource '{resource}' (allowed: {allowed:?})")]
    MethodNotAllowed {
        resource: String,
        method: String,
        allowed: Vec<String>,
    },

    /// The call names a request or response type the method does not declare.
    #[error("{kind} type '{payload_type}' is not declared by method {method} on resource '{resource}'")]
    TypeNotDeclared {
        kind: &'static str,
        resource: String,
        method: String,
        payload_type: String,
    },
}

impl ResolutionError {
    /// HTTP status the binding layer should answer with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ResolutionError::MediaTypeNotSupported { .. } => 406,
            ResolutionError::MediaTypeAmbiguous { .. } => 500,
            ResolutionError::PathNotMatched { .. }
            | ResolutionError::ApplicationNotFound { .. }
            | ResolutionError::ResourceNotFound { .. } => 404,
            ResolutionError::MethodNotAllowed { .. } => 405,
            ResolutionError::TypeNotDeclared { kind, .. } if *kind == "request" => 415,
            ResolutionError::TypeNotDeclared { .. } => 406,
        }
    }
}

/// The response entity could not be produced or accessed at all.
///
/// Executors return this (wrapped in `anyhow::Error`) to signal an unsendable
/// response. The dispatcher never catches it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("response unavailable: {message}")]
pub struct ResponseException {
    pub message: String,
}

impl ResponseException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A filter value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("filter '{name}' rejects value '{value}' (expected pattern {pattern})")]
pub struct FilterError {
    pub name: String,
    pub value: String,
    pub pattern: String,
}

/// Outcomes of [`crate::dispatcher::Dispatcher::dispatch`] that are not a response.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Response(#[from] ResponseException),

    /// The call could not be matched to declared metadata.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// An observer failed; treated as a configuration bug.
    #[error("event observer failed: {0:#}")]
    Observer(anyhow::Error),
}

impl DispatchError {
    /// HTTP status the binding layer should answer with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            DispatchError::Resolution(e) => e.status(),
            DispatchError::Response(_) | DispatchError::Observer(_) => 500,
        }
    }
}
