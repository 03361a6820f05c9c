use super::Middleware;
use crate::dispatcher::{Entity, Response};
use crate::events::BeforeExecutionEvent;
use crate::metadata::PayloadType;
use serde_json::json;
use tracing::warn;

/// Status a rejected call is canceled with.
pub const FORBIDDEN_STATUS: u16 = 403;

/// Authorizes calls before execution.
///
/// Cancels with 403 when the application requires an integral or confidential
/// transport and the call is not secure, or when the method restricts roles and the caller
/// holds none of them. Calls without a security context count as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityMiddleware;

impl SecurityMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn deny(event: &mut BeforeExecutionEvent, reason: &str) {
        let ctx = event.context();
        warn!(
            call_id = %ctx.call_id(),
            resource = %ctx.resource().name,
            method = %ctx.method().name,
            principal = ?ctx.security().and_then(|s| s.current_principal()),
            reason = %reason,
            "Call denied"
        );
        event.cancel(Response::new(
            FORBIDDEN_STATUS,
            Entity::value(
                PayloadType::any(),
                json!({ "error": reason, "status": FORBIDDEN_STATUS }),
            ),
        ));
    }
}

impl Middleware for SecurityMiddleware {
    fn before(&self, event: &mut BeforeExecutionEvent) -> anyhow::Result<()> {
        let ctx = event.context();
        let security = ctx.security();

        let guarantee = ctx.application().transport_guarantee;
        if guarantee.requires_secure() && !security.is_some_and(|s| s.is_secure()) {
            Self::deny(event, "secure transport required");
            return Ok(());
        }

        let method = ctx.method();
        if method.is_restricted() {
            let permitted = security.is_some_and(|s| {
                method.roles_allowed.iter().any(|role| s.is_user_in_role(role))
            });
            if !permitted {
                Self::deny(event, "caller holds none of the allowed roles");
            }
        }
        Ok(())
    }
}
