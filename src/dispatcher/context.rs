use crate::ids::CallId;
use crate::metadata::{Application, MethodRequest, MethodResponse, Resource, ResourceMethod};
use crate::security::SecurityContext;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A call parameter: one value or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(v) => Some(v),
            ParamValue::Multi(v) => v.first().map(String::as_str),
        }
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        match self {
            ParamValue::Single(v) => std::slice::from_ref(v),
            ParamValue::Multi(v) => v,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::Multi(value)
    }
}

/// Name → value parameters of one call. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: HashMap<String, ParamValue>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        self.values.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    /// First value of `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::first)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Parameters::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

/// Per-call state handed to executors and carried by execution events.
///
/// Created fresh for every dispatch and never shared between calls. Metadata is
/// read-only; the body and parameters may be enriched before execution.
pub struct ExecutionContext {
    call_id: CallId,
    application: Arc<Application>,
    resource: Arc<Resource>,
    method: Arc<ResourceMethod>,
    request: Option<Arc<MethodRequest>>,
    response: Arc<MethodResponse>,
    body: Option<Value>,
    parameters: Parameters,
    security: Option<Arc<dyn SecurityContext>>,
    started: Instant,
}

impl ExecutionContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        call_id: CallId,
        application: Arc<Application>,
        resource: Arc<Resource>,
        method: Arc<ResourceMethod>,
        request: Option<Arc<MethodRequest>>,
        response: Arc<MethodResponse>,
        body: Option<Value>,
        parameters: Parameters,
        security: Option<Arc<dyn SecurityContext>>,
    ) -> Self {
        Self {
            call_id,
            application,
            resource,
            method,
            request,
            response,
            body,
            parameters,
            security,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    #[must_use]
    pub fn application(&self) -> &Arc<Application> {
        &self.application
    }

    #[must_use]
    pub fn resource(&self) -> &Arc<Resource> {
        &self.resource
    }

    #[must_use]
    pub fn method(&self) -> &Arc<ResourceMethod> {
        &self.method
    }

    /// Request variant, absent for body-less calls.
    #[must_use]
    pub fn request(&self) -> Option<&Arc<MethodRequest>> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn response(&self) -> &Arc<MethodResponse> {
        &self.response
    }

    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: Option<Value>) {
        self.body = body;
    }

    pub fn take_body(&mut self) -> Option<Value> {
        self.body.take()
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    #[must_use]
    pub fn security(&self) -> Option<&Arc<dyn SecurityContext>> {
        self.security.as_ref()
    }

    /// Time since the context was built.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("call_id", &self.call_id)
            .field("application", &self.application.name)
            .field("resource", &self.resource.name)
            .field("method", &self.method.name)
            .field("request_type", &self.request.as_ref().map(|r| r.payload_type.name()))
            .field("response_type", &self.response.payload_type.name())
            .field("parameters", &self.parameters)
            .field("has_security", &self.security.is_some())
            .finish()
    }
}
