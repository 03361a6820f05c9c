use crate::events::{AfterExecutionEvent, BeforeExecutionEvent};

/// An observer attached to all three event channels.
///
/// Every hook defaults to a no-op. Returning an error aborts the dispatch with
/// [`crate::error::DispatchError::Observer`].
pub trait Middleware: Send + Sync {
    fn before(&self, _event: &mut BeforeExecutionEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_success(&self, _event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_failure(&self, _event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        Ok(())
    }
}
