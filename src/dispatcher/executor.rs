use super::context::ExecutionContext;
use super::response::{Entity, Response};
use crate::error::MetadataError;
use crate::metadata::{PayloadType, ANY_TYPE};
use crate::pattern::{NamePattern, MATCH_ANY};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// What an executor hands back on success.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// No entity; the method's default status applies.
    Empty,
    /// An entity of the call's response type.
    Entity(Value),
    /// A complete response; its status, entity and headers are unwrapped.
    Response(Response),
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Entity(value)
    }
}

impl From<Response> for Outcome {
    fn from(response: Response) -> Self {
        Outcome::Response(response)
    }
}

/// Business logic behind a resource method.
///
/// Any error becomes the call's failure entity, except a
/// [`crate::error::ResponseException`], which aborts the dispatch.
pub trait Executor: Send + Sync {
    fn execute(&self, ctx: &mut ExecutionContext) -> anyhow::Result<Outcome>;
}

impl<F> Executor for F
where
    F: Fn(&mut ExecutionContext) -> anyhow::Result<Outcome> + Send + Sync,
{
    fn execute(&self, ctx: &mut ExecutionContext) -> anyhow::Result<Outcome> {
        self(ctx)
    }
}

/// Which payload types an executor accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeMatch {
    #[default]
    Any,
    Only(BTreeSet<String>),
}

impl TypeMatch {
    /// Exact name containment; `Any` matches every type.
    #[must_use]
    pub fn matches(&self, type_name: &str) -> bool {
        match self {
            TypeMatch::Any => true,
            TypeMatch::Only(names) => names.contains(type_name),
        }
    }
}

/// Match criteria of an executor. Every pattern must match the whole name.
#[derive(Debug, Clone)]
pub struct ExecutorSpec {
    pub name: String,
    pub application: String,
    pub resource: String,
    pub method: String,
    pub response_types: TypeMatch,
    pub request_types: TypeMatch,
}

impl ExecutorSpec {
    /// Matches every call until narrowed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            application: MATCH_ANY.to_string(),
            resource: MATCH_ANY.to_string(),
            method: MATCH_ANY.to_string(),
            response_types: TypeMatch::Any,
            request_types: TypeMatch::Any,
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
    pub fn response_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_types = TypeMatch::Only(types.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn request_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_types = TypeMatch::Only(types.into_iter().map(Into::into).collect());
        self
    }
}

/// A compiled [`ExecutorSpec`] bound to its executor.
pub struct Binding {
    name: String,
    application: NamePattern,
    resource: NamePattern,
    method: NamePattern,
    response_types: TypeMatch,
    request_types: TypeMatch,
    executor: Arc<dyn Executor>,
}

impl Binding {
    /// # Errors
    ///
    /// [`MetadataError::Pattern`] if any pattern is not a valid regex.
    pub fn compile(spec: ExecutorSpec, executor: Arc<dyn Executor>) -> Result<Self, MetadataError> {
        let location = format!("executor '{}'", spec.name);
        Ok(Self {
            application: NamePattern::compile(&location, &spec.application)?,
            resource: NamePattern::compile(&location, &spec.resource)?,
            method: NamePattern::compile(&location, &spec.method)?,
            response_types: spec.response_types,
            request_types: spec.request_types,
            name: spec.name,
            executor,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// The structural match predicate. A missing request type counts as `any`.
    #[must_use]
    pub fn matches(&self, target: &CallTarget<'_>) -> bool {
        self.application.is_match(target.application)
            && self.resource.is_match(target.resource)
            && self.method.is_match(target.method)
            && self.response_types.matches(target.response_type)
            && self.request_types.matches(target.request_type.unwrap_or(ANY_TYPE))
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("application", &self.application.as_str())
            .field("resource", &self.resource.as_str())
            .field("method", &self.method.as_str())
            .field("response_types", &self.response_types)
            .field("request_types", &self.request_types)
            .finish()
    }
}

/// The names an executor binding is matched against.
#[derive(Debug, Clone, Copy)]
pub struct CallTarget<'a> {
    pub application: &'a str,
    pub resource: &'a str,
    pub method: &'a str,
    pub response_type: &'a str,
    pub request_type: Option<&'a str>,
}

/// Answers 501 for methods nobody implements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotImplementedExecutor;

pub const DEFAULT_EXECUTOR_NAME: &str = "default";

impl Executor for NotImplementedExecutor {
    fn execute(&self, ctx: &mut ExecutionContext) -> anyhow::Result<Outcome> {
        let message = format!(
            "method {} on resource '{}' is not implemented",
            ctx.method().name,
            ctx.resource().name
        );
        Ok(Outcome::Response(Response::new(
            501,
            Entity::value(
                PayloadType::any(),
                json!({ "error": message, "status": 501 }),
            ),
        )))
    }
}
