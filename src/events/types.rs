use crate::dispatcher::{Entity, ExecutionContext, HeaderValue, Headers, Response};
use crate::error::MetadataError;
use crate::pattern::{NamePattern, MATCH_ANY};
use std::fmt;

/// The three disjoint event channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Before,
    AfterSuccess,
    AfterFailure,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Channel::Before => "before",
            Channel::AfterSuccess => "after-success",
            Channel::AfterFailure => "after-failure",
        })
    }
}

/// Fired before the executor runs. Observers may enrich the context or cancel.
#[derive(Debug)]
pub struct BeforeExecutionEvent {
    ctx: ExecutionContext,
    substitute: Option<Response>,
}

impl BeforeExecutionEvent {
    pub(crate) fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            substitute: None,
        }
    }

    #[must_use]
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.ctx
    }

    /// Short-circuit the call with `response`. Only the first cancellation counts.
    pub fn cancel(&mut self, response: Response) {
        if self.substitute.is_none() {
            self.substitute = Some(response);
        }
    }

    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.substitute.is_some()
    }

    #[must_use]
    pub fn substitute(&self) -> Option<&Response> {
        self.substitute.as_ref()
    }

    pub(crate) fn into_parts(self) -> (ExecutionContext, Option<Response>) {
        (self.ctx, self.substitute)
    }
}

/// Fired after execution on the success or the failure channel.
///
/// The original entity is fixed; entity, status and headers form the outgoing
/// response and may be rewritten by observers.
#[derive(Debug)]
pub struct AfterExecutionEvent {
    ctx: ExecutionContext,
    original: Entity,
    entity: Entity,
    status: u16,
    headers: Headers,
    failed: bool,
}

impl AfterExecutionEvent {
    pub(crate) fn new(
        ctx: ExecutionContext,
        original: Entity,
        status: u16,
        headers: Headers,
        failed: bool,
    ) -> Self {
        Self {
            ctx,
            entity: original.clone(),
            original,
            status,
            headers,
            failed,
        }
    }

    #[must_use]
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// What the executor produced (or the error it failed with).
    #[must_use]
    pub fn original_entity(&self) -> &Entity {
        &self.original
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn set_new_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn set_status_code(&mut self, status: u16) {
        self.status = status;
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Accumulate a value under `name`.
    pub fn add_header_value(&mut self, name: &str, value: impl Into<HeaderValue>) {
        self.headers.add(name, value);
    }

    /// Replace all values under `name`.
    pub fn set_header_value(&mut self, name: &str, value: impl Into<HeaderValue>) {
        self.headers.set(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.failed
    }

    #[must_use]
    pub fn channel(&self) -> Channel {
        if self.failed {
            Channel::AfterFailure
        } else {
            Channel::AfterSuccess
        }
    }

    #[must_use]
    pub fn into_response(self) -> Response {
        Response::from_parts(self.status, Ok(self.entity), self.headers)
    }
}

impl From<AfterExecutionEvent> for Response {
    fn from(event: AfterExecutionEvent) -> Self {
        event.into_response()
    }
}

/// Which calls a subscription sees. Patterns must match whole names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSelector {
    pub application: String,
    pub resource: String,
    pub method: String,
    /// Only methods declaring this interceptor.
    pub interceptor: Option<String>,
}

impl Default for EventSelector {
    fn default() -> Self {
        Self::all()
    }
}

impl EventSelector {
    #[must_use]
    pub fn all() -> Self {
        Self {
            application: MATCH_ANY.to_string(),
            resource: MATCH_ANY.to_string(),
            method: MATCH_ANY.to_string(),
            interceptor: None,
        }
    }

    #[must_use]
    pub fn application(mut self, pattern: impl Into<String>) -> Self {
        self.application = pattern.into();
        self
    }

    #[must_use]
    pub fn resource(mut self, pattern: impl Into<String>) -> Self {
        self.resource = pattern.into();
        self
    }

    #[must_use]
    pub fn method(mut self, pattern: impl Into<String>) -> Self {
        self.method = pattern.into();
        self
    }

    #[must_use]
    pub fn interceptor(mut self, name: impl Into<String>) -> Self {
        self.interceptor = Some(name.into());
        self
    }

    pub(crate) fn compile(&self, location: &str) -> Result<CompiledSelector, MetadataError> {
        Ok(CompiledSelector {
            application: NamePattern::compile(location, &self.application)?,
            resource: NamePattern::compile(location, &self.resource)?,
            method: NamePattern::compile(location, &self.method)?,
            interceptor: self.interceptor.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledSelector {
    application: NamePattern,
    resource: NamePattern,
    method: NamePattern,
    interceptor: Option<String>,
}

impl CompiledSelector {
    pub(crate) fn matches(&self, ctx: &ExecutionContext) -> bool {
        self.application.is_match(&ctx.application().name)
            && self.resource.is_match(&ctx.resource().name)
            && self.method.is_match(&ctx.method().name)
            && self
                .interceptor
                .as_deref()
                .is_none_or(|i| ctx.method().declares_interceptor(i))
    }
}
