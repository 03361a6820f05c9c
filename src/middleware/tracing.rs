use super::Middleware;
use crate::events::{AfterExecutionEvent, BeforeExecutionEvent};
use tracing::{debug, info, warn, Span};

/// Logs every call and records `status` / `latency_ms` on the dispatch span.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

impl TracingMiddleware {
    fn finish(event: &AfterExecutionEvent) {
        let ctx = event.context();
        let latency_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX);
        let span = Span::current();
        span.record("status", event.status_code());
        span.record("latency_ms", latency_ms);
        if event.is_failure() {
            warn!(
                call_id = %ctx.call_id(),
                resource = %ctx.resource().name,
                method = %ctx.method().name,
                status = event.status_code(),
                latency_ms,
                "Call failed"
            );
        } else {
            info!(
                call_id = %ctx.call_id(),
                resource = %ctx.resource().name,
                method = %ctx.method().name,
                status = event.status_code(),
                latency_ms,
                "Call completed"
            );
        }
    }
}

impl Middleware for TracingMiddleware {
    fn before(&self, event: &mut BeforeExecutionEvent) -> anyhow::Result<()> {
        let ctx = event.context();
        debug!(
            call_id = %ctx.call_id(),
            resource = %ctx.resource().name,
            method = %ctx.method().name,
            parameters = ctx.parameters().len(),
            has_body = ctx.body().is_some(),
            "Call started"
        );
        Ok(())
    }

    fn on_success(&self, event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        Self::finish(event);
        Ok(())
    }

    fn on_failure(&self, event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        Self::finish(event);
        Ok(())
    }
}
