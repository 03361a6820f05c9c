use super::Middleware;
use crate::dispatcher::Entity;
use crate::events::{AfterExecutionEvent, FAILURE_STATUS};
use crate::metadata::PayloadType;
use serde_json::json;

/// Turns failure entities into JSON problem bodies on the failure channel.
///
/// The body is `{ "error": message, "status": n }`. A status already chosen
/// for the failure (such as 400 for a rejected filter) is kept; anything
/// outside the error range becomes 500.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorMappingMiddleware;

impl Middleware for ErrorMappingMiddleware {
    fn on_failure(&self, event: &mut AfterExecutionEvent) -> anyhow::Result<()> {
        let Some(error) = event.entity().as_failure() else {
            return Ok(());
        };
        let message = format!("{error:#}");
        let status = match event.status_code() {
            s @ 400..=599 => s,
            _ => FAILURE_STATUS,
        };
        event.set_status_code(status);
        event.set_new_entity(Entity::value(
            PayloadType::any(),
            json!({ "error": message, "status": status }),
        ));
        Ok(())
    }
}
