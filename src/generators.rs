//! # Generators Module
//!
//! Named strategies that produce filter values and response header values.
//!
//! Filters and headers reference a generator by name; the [`GeneratorRegistry`]
//! resolves the name per call. Unknown names fall back to the `default`
//! generator with a warning, and [`crate::linter`] reports them at startup.
//!
//! Built-ins:
//!
//! | name      | filter value           | header value                      |
//! |-----------|------------------------|-----------------------------------|
//! | `default` | the declared default   | the declared default, typed by kind |
//! | `now`     | RFC 3339 timestamp     | current time as an HTTP-date      |
//! | `call-id` | the call's id          | the call's id                     |

use crate::dispatcher::{ExecutionContext, HeaderValue};
use crate::metadata::{Filter, HeaderKind, ResponseHeader};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_GENERATOR: &str = "default";
pub const NOW_GENERATOR: &str = "now";
pub const CALL_ID_GENERATOR: &str = "call-id";

/// Produces a value for a filter that the caller did not supply.
pub trait ValueGenerator: Send + Sync {
    fn generate(&self, filter: &Filter, ctx: &ExecutionContext) -> Option<String>;
}

/// Produces the value of a declared response header.
pub trait HeaderGenerator: Send + Sync {
    fn generate(&self, header: &ResponseHeader, ctx: &ExecutionContext) -> Option<HeaderValue>;
}

/// Declared default; for headers, typed by the header kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGenerator;

impl ValueGenerator for DefaultGenerator {
    fn generate(&self, filter: &Filter, _ctx: &ExecutionContext) -> Option<String> {
        filter.default.clone()
    }
}

impl HeaderGenerator for DefaultGenerator {
    fn generate(&self, header: &ResponseHeader, _ctx: &ExecutionContext) -> Option<HeaderValue> {
        let default = header.default.as_deref().map(str::trim);
        match header.kind {
            HeaderKind::Default => default.map(HeaderValue::from),
            HeaderKind::Integer => default
                .and_then(|d| d.parse::<i64>().ok())
                .map(HeaderValue::Number),
            HeaderKind::Date => match default {
                Some(d) => DateTime::parse_from_rfc2822(d)
                    .ok()
                    .map(|dt| HeaderValue::Date(dt.with_timezone(&Utc))),
                None => Some(HeaderValue::Date(Utc::now())),
            },
        }
    }
}

/// The current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NowGenerator;

impl ValueGenerator for NowGenerator {
    fn generate(&self, _filter: &Filter, _ctx: &ExecutionContext) -> Option<String> {
        Some(Utc::now().to_rfc3339())
    }
}

impl HeaderGenerator for NowGenerator {
    fn generate(&self, _header: &ResponseHeader, _ctx: &ExecutionContext) -> Option<HeaderValue> {
        Some(HeaderValue::Date(Utc::now()))
    }
}

/// The id of the current call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallIdGenerator;

impl ValueGenerator for CallIdGenerator {
    fn generate(&self, _filter: &Filter, ctx: &ExecutionContext) -> Option<String> {
        Some(ctx.call_id().to_string())
    }
}

impl HeaderGenerator for CallIdGenerator {
    fn generate(&self, _header: &ResponseHeader, ctx: &ExecutionContext) -> Option<HeaderValue> {
        Some(HeaderValue::Text(ctx.call_id().to_string()))
    }
}

/// Name → generator tables for filter values and header values.
pub struct GeneratorRegistry {
    values: HashMap<String, Arc<dyn ValueGenerator>>,
    headers: HashMap<String, Arc<dyn HeaderGenerator>>,
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorRegistry {
    /// Registry with the `default`, `now` and `call-id` generators.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            values: HashMap::new(),
            headers: HashMap::new(),
        };
        registry.register_value(DEFAULT_GENERATOR, Arc::new(DefaultGenerator));
        registry.register_value(NOW_GENERATOR, Arc::new(NowGenerator));
        registry.register_value(CALL_ID_GENERATOR, Arc::new(CallIdGenerator));
        registry.register_header(DEFAULT_GENERATOR, Arc::new(DefaultGenerator));
        registry.register_header(NOW_GENERATOR, Arc::new(NowGenerator));
        registry.register_header(CALL_ID_GENERATOR, Arc::new(CallIdGenerator));
        registry
    }

    /// Register or replace a filter value generator.
    pub fn register_value(&mut self, name: &str, generator: Arc<dyn ValueGenerator>) {
        self.values.insert(name.to_string(), generator);
    }

    /// Register or replace a header value generator.
    pub fn register_header(&mut self, name: &str, generator: Arc<dyn HeaderGenerator>) {
        self.headers.insert(name.to_string(), generator);
    }

    #[must_use]
    pub fn has_value_generator(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn has_header_generator(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Value for `filter` from its generator, else the declared default.
    pub fn filter_value(&self, filter: &Filter, ctx: &ExecutionContext) -> Option<String> {
        match self.values.get(&filter.generator) {
            Some(generator) => generator
                .generate(filter, ctx)
                .or_else(|| filter.default.clone()),
            None => {
                warn!(
                    filter = %filter.name,
                    generator = %filter.generator,
                    "Unknown value generator, using declared default"
                );
                ValueGenerator::generate(&DefaultGenerator, filter, ctx)
            }
        }
    }

    /// Value for `header` from its generator.
    pub fn header_value(&self, header: &ResponseHeader, ctx: &ExecutionContext) -> Option<HeaderValue> {
        match self.headers.get(&header.generator) {
            Some(generator) => generator.generate(header, ctx),
            None => {
                warn!(
                    header = %header.name,
                    generator = %header.generator,
                    "Unknown header generator, using declared default"
                );
                HeaderGenerator::generate(&DefaultGenerator, header, ctx)
            }
        }
    }
}
