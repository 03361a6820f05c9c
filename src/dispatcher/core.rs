use super::call::Call;
use super::context::ExecutionContext;
use super::executor::{
    Binding, CallTarget, Executor, ExecutorSpec, NotImplementedExecutor, DEFAULT_EXECUTOR_NAME,
};
use super::options::{OptionsExecutor, OPTIONS_EXECUTOR_NAME};
use super::response::Response;
use crate::error::{DispatchError, MetadataError, ResolutionError};
use crate::events::{EventBus, EventSelector, Pipeline};
use crate::generators::GeneratorRegistry;
use crate::ids::CallId;
use crate::metadata::{Application, MethodRequest, MethodResponse, ResourceMethod, OPTIONS_METHOD};
use crate::middleware::Middleware;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

/// An executor chosen for a call.
#[derive(Clone)]
pub struct ResolvedExecutor {
    pub name: String,
    pub executor: Arc<dyn Executor>,
    /// True when no binding matched and the default executor answers.
    pub is_default: bool,
}

impl std::fmt::Debug for ResolvedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedExecutor")
            .field("name", &self.name)
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// Resolves calls to executors and drives them through the event pipeline.
///
/// Configured at startup (executors, observers, generators), then shared
/// read-only; each [`dispatch`](Self::dispatch) builds its own context.
pub struct Dispatcher {
    application: Arc<Application>,
    bindings: Vec<Binding>,
    options: Option<Binding>,
    default_executor: Arc<dyn Executor>,
    events: EventBus,
    generators: GeneratorRegistry,
}

impl Dispatcher {
    /// A dispatcher for `application` with the introspection executor for
    /// `OPTIONS` and a 501 default executor.
    pub fn new(application: Arc<Application>) -> Self {
        let options = Binding::compile(
            ExecutorSpec::new(OPTIONS_EXECUTOR_NAME).method(OPTIONS_METHOD),
            Arc::new(OptionsExecutor),
        )
        .map_err(|e| warn!(error = %e, "Options executor unavailable"))
        .ok();
        info!(application = %application.name, "Dispatcher created");
        Self {
            application,
            bindings: Vec::new(),
            options,
            default_executor: Arc::new(NotImplementedExecutor),
            events: EventBus::new(),
            generators: GeneratorRegistry::new(),
        }
    }

    #[must_use]
    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    /// Bind `executor` to the calls `spec` matches.
    ///
    /// Bindings are tried in registration order; the first match wins.
    ///
    /// # Errors
    ///
    /// [`MetadataError::Duplicate`] for a name already bound, or
    /// [`MetadataError::Pattern`] for an invalid pattern.
    pub fn register_executor(
        &mut self,
        spec: ExecutorSpec,
        executor: Arc<dyn Executor>,
    ) -> Result<(), MetadataError> {
        if self.bindings.iter().any(|b| b.name() == spec.name) {
            return Err(MetadataError::Duplicate {
                kind: "executor",
                name: spec.name,
                owner: "dispatcher".to_string(),
            });
        }
        let binding = Binding::compile(spec, executor)?;
        info!(
            executor = %binding.name(),
            total_executors = self.bindings.len() + 1,
            "Executor registered"
        );
        self.bindings.push(binding);
        Ok(())
    }

    /// Replace the executor used when no binding matches.
    pub fn set_default_executor(&mut self, executor: Arc<dyn Executor>) {
        self.default_executor = executor;
    }

    /// Stop answering `OPTIONS` with the resource descriptor.
    pub fn disable_options_executor(&mut self) {
        self.options = None;
    }

    /// Subscribe `middleware` to every channel for the calls `selector` matches.
    ///
    /// # Errors
    ///
    /// [`MetadataError::Pattern`] if a selector pattern is invalid.
    pub fn add_middleware(
        &mut self,
        name: &str,
        selector: EventSelector,
        middleware: Arc<dyn Middleware>,
    ) -> Result<(), MetadataError> {
        self.events.attach(name, selector, middleware)
    }

    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    #[must_use]
    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    pub fn generators_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.generators
    }

    /// Registered executor names, in match order.
    #[must_use]
    pub fn executor_names(&self) -> Vec<&str> {
        self.bindings.iter().map(Binding::name).collect()
    }

    /// The first binding matching `target`, then the options executor, then the default.
    #[must_use]
    pub fn resolve_executor(&self, target: &CallTarget<'_>) -> ResolvedExecutor {
        let found = self
            .bindings
            .iter()
            .chain(self.options.iter())
            .find(|b| b.matches(target));
        match found {
            Some(binding) => {
                debug!(
                    executor = %binding.name(),
                    resource = %target.resource,
                    method = %target.method,
                    "Executor resolved"
                );
                ResolvedExecutor {
                    name: binding.name().to_string(),
                    executor: Arc::clone(binding.executor()),
                    is_default: false,
                }
            }
            None => {
                debug!(
                    resource = %target.resource,
                    method = %target.method,
                    "No executor matched, using default"
                );
                ResolvedExecutor {
                    name: DEFAULT_EXECUTOR_NAME.to_string(),
                    executor: Arc::clone(&self.default_executor),
                    is_default: true,
                }
            }
        }
    }

    /// Run `call` through the full pipeline.
    ///
    /// Every call yields exactly one [`Response`] or one [`DispatchError`]. Executor
    /// failures are responses (routed through the failure channel), not errors.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Resolution`] when the call does not fit the metadata,
    /// [`DispatchError::Response`] for a [`crate::error::ResponseException`], and
    /// [`DispatchError::Observer`] when an observer fails.
    pub fn dispatch(&self, call: Call) -> Result<Response, DispatchError> {
        let call_id = call.call_id.unwrap_or_default();
        let span = info_span!(
            "dispatch",
            call_id = %call_id,
            application = %self.application.name,
            resource = %call.resource,
            method = %call.method,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty
        );
        let _guard = span.enter();

        let ctx = self.build_context(call_id, call)?;
        let response_type = ctx.response().payload_type.name().to_string();
        let request_type = ctx.request().map(|r| r.payload_type.name().to_string());
        let target = CallTarget {
            application: &self.application.name,
            resource: &ctx.resource().name,
            method: &ctx.method().name,
            response_type: &response_type,
            request_type: request_type.as_deref(),
        };
        let resolved = self.resolve_executor(&target);

        let mut pipeline = Pipeline::new(&self.events, &self.generators);
        let result = pipeline.run(ctx, resolved.executor.as_ref());
        match &result {
            Ok(response) => debug!(
                executor = %resolved.name,
                status = response.status(),
                states = ?pipeline.history(),
                "Dispatch complete"
            ),
            Err(e) => warn!(executor = %resolved.name, error = %e, "Dispatch aborted"),
        }
        result
    }

    fn build_context(&self, call_id: CallId, call: Call) -> Result<ExecutionContext, ResolutionError> {
        if let Some(application) = call.application.as_deref() {
            if application != self.application.name {
                return Err(ResolutionError::ApplicationNotFound {
                    application: application.to_string(),
                });
            }
        }
        let resource = self
            .application
            .resource(&call.resource)
            .ok_or_else(|| ResolutionError::ResourceNotFound {
                resource: call.resource.clone(),
            })?;
        let method = resource
            .method(&call.method)
            .ok_or_else(|| ResolutionError::MethodNotAllowed {
                resource: resource.name.clone(),
                method: call.method.clone(),
                allowed: resource.allowed_methods().into_iter().map(String::from).collect(),
            })?;
        let response = select_response(method, call.response_type.as_deref())?;
        let request = select_request(method, call.request_type.as_deref(), call.body.is_some())?;

        Ok(ExecutionContext::new(
            call_id,
            Arc::clone(&self.application),
            Arc::clone(resource),
            Arc::clone(method),
            request,
            response,
            call.body,
            call.parameters,
            call.security,
        ))
    }
}

fn select_response(
    method: &ResourceMethod,
    requested: Option<&str>,
) -> Result<Arc<MethodResponse>, ResolutionError> {
    let found = match requested {
        Some(name) => method.response(name),
        None => method.responses.values().next(),
    };
    found.map(Arc::clone).ok_or_else(|| ResolutionError::TypeNotDeclared {
        kind: "response",
        resource: method.resource.clone(),
        method: method.name.clone(),
        payload_type: requested.unwrap_or_default().to_string(),
    })
}

/// A named request type must be declared; without a name, a body selects the
/// first declared request variant.
fn select_request(
    method: &ResourceMethod,
    requested: Option<&str>,
    has_body: bool,
) -> Result<Option<Arc<MethodRequest>>, ResolutionError> {
    match requested {
        Some(name) => method
            .request(name)
            .map(|r| Some(Arc::clone(r)))
            .ok_or_else(|| ResolutionError::TypeNotDeclared {
                kind: "request",
                resource: method.resource.clone(),
                method: method.name.clone(),
                payload_type: name.to_string(),
            }),
        None if has_body => Ok(method.requests.values().next().map(Arc::clone)),
        None => Ok(None),
    }
}
