use super::bus::EventBus;
use super::types::{AfterExecutionEvent, BeforeExecutionEvent};
use crate::dispatcher::{Entity, ExecutionContext, Executor, Headers, Outcome, Response};
use crate::error::{DispatchError, FilterError, ResponseException};
use crate::generators::GeneratorRegistry;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Status used for executor failures unless an observer chooses another.
pub const FAILURE_STATUS: u16 = 500;
/// Status used when a filter rejects a parameter.
pub const FILTER_FAILURE_STATUS: u16 = 400;
/// Status of a successful call to a `see_other` method.
pub const SEE_OTHER_STATUS: u16 = 303;

/// Lifecycle of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Created,
    BeforeFired,
    Canceled,
    Executing,
    AfterFired,
    Done,
}

/// Drives one call through before-event, execution and after-event.
///
/// One instance per call; never shared.
pub struct Pipeline<'a> {
    bus: &'a EventBus,
    generators: &'a GeneratorRegistry,
    history: SmallVec<[PipelineState; 6]>,
}

impl<'a> Pipeline<'a> {
    pub fn new(bus: &'a EventBus, generators: &'a GeneratorRegistry) -> Self {
        Self {
            bus,
            generators,
            history: SmallVec::new(),
        }
    }

    /// States visited so far, in order.
    #[must_use]
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    #[must_use]
    pub fn state(&self) -> Option<PipelineState> {
        self.history.last().copied()
    }

    fn enter(&mut self, ctx: &ExecutionContext, state: PipelineState) {
        debug!(call_id = %ctx.call_id(), state = ?state, "Pipeline transition");
        self.history.push(state);
    }

    /// Run the call to completion.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Response`] when the executor or an observer raises a
    /// [`ResponseException`]; [`DispatchError::Observer`] for any other observer
    /// error. Executor errors are never returned here: they become the failure entity.
    pub fn run(
        &mut self,
        ctx: ExecutionContext,
        executor: &dyn Executor,
    ) -> Result<Response, DispatchError> {
        self.enter(&ctx, PipelineState::Created);

        let mut before = BeforeExecutionEvent::new(ctx);
        self.enter(before.context(), PipelineState::BeforeFired);
        self.bus.fire_before(&mut before).map_err(observer_error)?;
        let (mut ctx, substitute) = before.into_parts();
        if let Some(response) = substitute {
            self.enter(&ctx, PipelineState::Canceled);
            debug!(call_id = %ctx.call_id(), status = response.status(), "Call canceled before execution");
            return Ok(response);
        }

        let (original, status, headers, failed) = match apply_filters(&mut ctx, self.generators) {
            Err(rejected) => {
                warn!(call_id = %ctx.call_id(), error = %rejected, "Filter rejected call");
                (
                    Entity::failure(rejected.into()),
                    FILTER_FAILURE_STATUS,
                    Headers::new(),
                    true,
                )
            }
            Ok(()) => {
                self.enter(&ctx, PipelineState::Executing);
                execute(&mut ctx, executor)?
            }
        };

        let mut after = AfterExecutionEvent::new(ctx, original, status, headers, failed);
        if !failed {
            self.decorate_success(&mut after);
        }
        self.enter(after.context(), PipelineState::AfterFired);
        self.bus.fire_after(&mut after).map_err(observer_error)?;

        self.enter(after.context(), PipelineState::Done);
        Ok(after.into_response())
    }

    /// Declared headers and the `see_other` redirect, added before observers run.
    fn decorate_success(&self, event: &mut AfterExecutionEvent) {
        let mut generated = Vec::new();
        let ctx = event.context();
        let declared = ctx
            .method()
            .headers
            .iter()
            .chain(ctx.response().headers.iter());
        for header in declared {
            if let Some(value) = self.generators.header_value(header, ctx) {
                generated.push((header.name.clone(), value));
            }
        }

        let location = ctx.method().see_other.as_deref().and_then(|target| {
            let app = ctx.application();
            let resource = app.resource(target)?;
            let path = resource
                .template
                .render_with(|name| ctx.parameters().first(name));
            if path.is_none() {
                warn!(
                    call_id = %ctx.call_id(),
                    target = %target,
                    "Cannot render see-other location from call parameters"
                );
            }
            path.map(|p| format!("{}{}", app.base_path, p))
        });

        for (name, value) in generated {
            event.add_header_value(&name, value);
        }
        if let Some(location) = location {
            event.set_status_code(SEE_OTHER_STATUS);
            event.set_header_value("Location", location);
        }
    }
}

/// Map an observer error to a dispatch error, keeping response exceptions typed.
fn observer_error(error: anyhow::Error) -> DispatchError {
    match error.downcast_ref::<ResponseException>() {
        Some(e) => DispatchError::Response(e.clone()),
        None => DispatchError::Observer(error),
    }
}

fn execute(
    ctx: &mut ExecutionContext,
    executor: &dyn Executor,
) -> Result<(Entity, u16, Headers, bool), DispatchError> {
    let status = ctx.response().status;
    match executor.execute(ctx) {
        Ok(Outcome::Empty) => Ok((Entity::Empty, status, Headers::new(), false)),
        Ok(Outcome::Entity(value)) => Ok((
            Entity::value(ctx.response().payload_type.clone(), value),
            status,
            Headers::new(),
            false,
        )),
        Ok(Outcome::Response(response)) => {
            let (status, entity, headers) = response.into_parts();
            let entity = entity?;
            let failed = entity.is_failure();
            Ok((entity, status, headers, failed))
        }
        Err(error) => {
            if let Some(e) = error.downcast_ref::<ResponseException>() {
                return Err(DispatchError::Response(e.clone()));
            }
            let message = format!("{error:#}");
            debug!(call_id = %ctx.call_id(), error = %message, "Executor failed");
            Ok((Entity::failure(error), FAILURE_STATUS, Headers::new(), true))
        }
    }
}

/// Fill missing filter values from generators and validate every present value.
fn apply_filters(
    ctx: &mut ExecutionContext,
    generators: &GeneratorRegistry,
) -> Result<(), FilterError> {
    let method = std::sync::Arc::clone(ctx.method());
    for filter in &method.filters {
        if !ctx.parameters().contains(&filter.name) {
            if let Some(value) = generators.filter_value(filter, ctx) {
                ctx.parameters_mut().set(filter.name.clone(), value);
            }
        }
        let Some(param) = ctx.parameters().get(&filter.name) else {
            continue;
        };
        if let Some(bad) = param.values().iter().find(|v| !filter.accepts(v)) {
            return Err(FilterError {
                name: filter.name.clone(),
                value: bad.clone(),
                pattern: filter
                    .pattern
                    .as_ref()
                    .map_or_else(|| format!("{:?}", filter.value_type).to_lowercase(), |p| p.to_string()),
            });
        }
    }
    Ok(())
}
