//! # Security Module
//!
//! Authorization integration points. Authentication happens elsewhere; by the time a
//! call is dispatched the binding layer attaches a [`SecurityContext`] describing
//! who is calling and over what kind of transport.
//!
//! The context is consumed by [`crate::middleware::SecurityMiddleware`], a
//! before-execution observer; the dispatcher never calls it directly.
//!
//! ```rust
//! use declarest::security::{SecurityContext, StaticSecurityContext};
//!
//! let ctx = StaticSecurityContext::new("ann").with_roles(["viewer"]).secure(true);
//! assert!(ctx.is_user_in_role("viewer"));
//! assert_eq!(ctx.current_principal().as_deref(), Some("ann"));
//! ```

use std::collections::BTreeSet;

/// Caller identity as seen by authorization checks.
pub trait SecurityContext: Send + Sync {
    fn is_user_in_role(&self, role: &str) -> bool;

    /// Principal name, `None` when the caller is anonymous.
    fn current_principal(&self) -> Option<String>;

    /// True when the call arrived over a secure transport.
    fn is_secure(&self) -> bool {
        false
    }
}

/// A fixed principal with a fixed role set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSecurityContext {
    principal: Option<String>,
    roles: BTreeSet<String>,
    secure: bool,
}

impl StaticSecurityContext {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: Some(principal.into()),
            ..Self::default()
        }
    }

    /// No principal, no roles.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl SecurityContext for StaticSecurityContext {
    fn is_user_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    fn current_principal(&self) -> Option<String> {
        self.principal.clone()
    }

    fn is_secure(&self) -> bool {
        self.secure
    }
}
