use super::context::{ParamValue, Parameters};
use crate::ids::CallId;
use crate::router::RouteMatch;
use crate::security::SecurityContext;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// An inbound call descriptor, as the binding layer hands it over.
///
/// Request and response types are optional: when omitted the dispatcher picks the
/// method's single declared variant, or the first by name. Without an application
/// name the call goes to whichever application the dispatcher serves.
#[derive(Clone, Default)]
pub struct Call {
    pub(crate) call_id: Option<CallId>,
    pub(crate) application: Option<String>,
    pub(crate) resource: String,
    pub(crate) method: String,
    pub(crate) response_type: Option<String>,
    pub(crate) request_type: Option<String>,
    pub(crate) body: Option<Value>,
    pub(crate) parameters: Parameters,
    pub(crate) security: Option<Arc<dyn SecurityContext>>,
}

impl Call {
    pub fn new(resource: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    /// A call on a routed resource, seeded with its path parameters.
    pub fn from_route(route: &RouteMatch, method: impl Into<String>) -> Self {
        let mut call = Self::new(route.resource.name.clone(), method);
        for (name, value) in &route.path_params {
            call.parameters.set(name.to_string(), value.clone());
        }
        call
    }

    #[must_use]
    pub fn call_id(mut self, id: CallId) -> Self {
        self.call_id = Some(id);
        self
    }

    /// Address the call to a named application.
    #[must_use]
    pub fn application(mut self, name: impl Into<String>) -> Self {
        self.application = Some(name.into());
        self
    }

    #[must_use]
    pub fn response_type(mut self, name: impl Into<String>) -> Self {
        self.response_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn request_type(mut self, name: impl Into<String>) -> Self {
        self.request_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.set(name, value);
        self
    }

    #[must_use]
    pub fn security(mut self, security: Arc<dyn SecurityContext>) -> Self {
        self.security = Some(security);
        self
    }

    #[must_use]
    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("call_id", &self.call_id)
            .field("application", &self.application)
            .field("resource", &self.resource)
            .field("method", &self.method)
            .field("response_type", &self.response_type)
            .field("request_type", &self.request_type)
            .field("has_body", &self.body.is_some())
            .field("parameters", &self.parameters)
            .field("has_security", &self.security.is_some())
            .finish()
    }
}
