use crate::error::ResponseException;
use crate::metadata::PayloadType;
use chrono::{DateTime, Utc};
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Most headers carry one or two values.
pub const MAX_INLINE_HEADER_VALUES: usize = 2;

/// A typed header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Text(String),
    Number(i64),
    /// Rendered as an HTTP-date (`Sun, 06 Nov 1994 08:49:37 GMT`).
    Date(DateTime<Utc>),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(s) => f.write_str(s),
            HeaderValue::Number(n) => write!(f, "{n}"),
            HeaderValue::Date(d) => write!(f, "{}", d.format("%a, %d %b %Y %H:%M:%S GMT")),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Text(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Text(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        HeaderValue::Number(value)
    }
}

impl From<DateTime<Utc>> for HeaderValue {
    fn from(value: DateTime<Utc>) -> Self {
        HeaderValue::Date(value)
    }
}

pub type HeaderValues = SmallVec<[HeaderValue; MAX_INLINE_HEADER_VALUES]>;

/// Ordered multi-valued headers with case-insensitive names.
///
/// [`add`](Headers::add) accumulates values under a name in insertion order;
/// [`set`](Headers::set) replaces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, HeaderValues)>,
}

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    pub fn add(&mut self, name: &str, value: impl Into<HeaderValue>) {
        let value = value.into();
        match self.position(name) {
            Some(idx) => self.entries[idx].1.push(value),
            None => {
                let mut values = HeaderValues::new();
                values.push(value);
                self.entries.push((name.to_string(), values));
            }
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<HeaderValue>) {
        let mut values = HeaderValues::new();
        values.push(value.into());
        match self.position(name) {
            Some(idx) => self.entries[idx].1 = values,
            None => self.entries.push((name.to_string(), values)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<HeaderValues> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[HeaderValue]> {
        self.position(name).map(|idx| self.entries[idx].1.as_slice())
    }

    #[must_use]
    pub fn first(&self, name: &str) -> Option<&HeaderValue> {
        self.get(name).and_then(<[HeaderValue]>::first)
    }

    /// All values of `name` rendered and joined with `", "`.
    #[must_use]
    pub fn get_joined(&self, name: &str) -> Option<String> {
        self.get(name).map(|values| {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HeaderValue])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append every value of `other`, accumulating under existing names.
    pub fn extend_from(&mut self, other: &Headers) {
        for (name, values) in other.iter() {
            for value in values {
                self.add(name, value.clone());
            }
        }
    }
}

/// What a call produced.
#[derive(Debug, Clone)]
pub enum Entity {
    Empty,
    Value { payload_type: PayloadType, value: Value },
    /// An executor or filter error routed through the failure channel.
    Failure(Arc<anyhow::Error>),
}

impl Entity {
    pub fn value(payload_type: PayloadType, value: Value) -> Self {
        Entity::Value { payload_type, value }
    }

    pub fn failure(error: anyhow::Error) -> Self {
        Entity::Failure(Arc::new(error))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Entity::Failure(_))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Entity::Empty)
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entity::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_failure(&self) -> Option<&Arc<anyhow::Error>> {
        match self {
            Entity::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// The failure's root error, if it is an `E`.
    #[must_use]
    pub fn downcast_failure<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.as_failure().and_then(|e| e.downcast_ref::<E>())
    }

    /// Runtime payload type; `any` for empty entities, `failure` for failures.
    #[must_use]
    pub fn payload_type(&self) -> PayloadType {
        match self {
            Entity::Empty => PayloadType::any(),
            Entity::Value { payload_type, .. } => payload_type.clone(),
            Entity::Failure(_) => PayloadType::failure(),
        }
    }

    /// Body to hand to a writer. Failures render as their message chain.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Entity::Empty => Value::Null,
            Entity::Value { value, .. } => value.clone(),
            Entity::Failure(e) => Value::String(format!("{e:#}")),
        }
    }
}

/// Status, entity and headers of a finished call.
///
/// The entity may be unavailable; [`Response::entity`] then returns the
/// [`ResponseException`] instead of a value.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    entity: Result<Entity, ResponseException>,
    headers: Headers,
}

impl Response {
    pub fn new(status: u16, entity: Entity) -> Self {
        Self {
            status,
            entity: Ok(entity),
            headers: Headers::new(),
        }
    }

    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, Entity::Empty)
    }

    /// A response whose entity cannot be produced.
    #[must_use]
    pub fn unavailable(status: u16, error: ResponseException) -> Self {
        Self {
            status,
            entity: Err(error),
            headers: Headers::new(),
        }
    }

    pub(crate) fn from_parts(
        status: u16,
        entity: Result<Entity, ResponseException>,
        headers: Headers,
    ) -> Self {
        Self {
            status,
            entity,
            headers,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<HeaderValue>) -> Self {
        self.headers.add(name, value);
        self
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// # Errors
    ///
    /// The [`ResponseException`] if the entity could not be produced.
    pub fn entity(&self) -> Result<&Entity, ResponseException> {
        self.entity.as_ref().map_err(Clone::clone)
    }

    /// # Errors
    ///
    /// The [`ResponseException`] if the entity could not be produced.
    pub fn into_entity(self) -> Result<Entity, ResponseException> {
        self.entity
    }

    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub(crate) fn into_parts(self) -> (u16, Result<Entity, ResponseException>, Headers) {
        (self.status, self.entity, self.headers)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
