use crate::error::MetadataError;
use crate::media::MediaType;
use crate::pattern::NamePattern;
use crate::router::PathTemplate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Name of the universal supertype.
pub const ANY_TYPE: &str = "any";
/// Payload type carried by failure entities.
pub const FAILURE_TYPE: &str = "failure";
/// Method name answered by the introspection executor.
pub const OPTIONS_METHOD: &str = "OPTIONS";

/// A named payload type with its flattened ancestor chain.
///
/// Stands in for class assignability: a type is assignable to itself, to each of
/// its declared ancestors, and to [`ANY_TYPE`]. Equality and hashing use the name only.
#[derive(Debug, Clone)]
pub struct PayloadType {
    name: Arc<str>,
    ancestors: Arc<[Arc<str>]>,
}

impl PayloadType {
    /// A root type with no ancestors besides `any`.
    pub fn named(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            ancestors: Arc::from(Vec::new()),
        }
    }

    #[must_use]
    pub fn any() -> Self {
        Self::named(ANY_TYPE)
    }

    #[must_use]
    pub fn failure() -> Self {
        Self::named(FAILURE_TYPE)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_any(&self) -> bool {
        &*self.name == ANY_TYPE
    }

    /// Declared ancestors, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> &[Arc<str>] {
        &self.ancestors
    }

    /// True if a value of type `other` may be handled where `self` is expected.
    #[must_use]
    pub fn is_assignable_from(&self, other: &PayloadType) -> bool {
        self.is_any()
            || self.name == other.name
            || other.ancestors.iter().any(|a| *a == self.name)
    }
}

impl PartialEq for PayloadType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PayloadType {}

impl Hash for PayloadType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Declared payload types of one application.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, PayloadType>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry holding the built-in `any` and `failure` types.
    #[must_use]
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert(ANY_TYPE.to_string(), PayloadType::any());
        types.insert(FAILURE_TYPE.to_string(), PayloadType::failure());
        Self { types }
    }

    /// Declare `name` with direct supertypes `extends`, which must already exist.
    ///
    /// # Errors
    ///
    /// [`MetadataError::Duplicate`] if `name` exists, [`MetadataError::UnknownType`] if a
    /// supertype is undeclared.
    pub fn declare(&mut self, name: &str, extends: &[String]) -> Result<PayloadType, MetadataError> {
        if self.types.contains_key(name) {
            return Err(MetadataError::Duplicate {
                kind: "type",
                name: name.to_string(),
                owner: "type registry".to_string(),
            });
        }
        let mut ancestors: Vec<Arc<str>> = Vec::new();
        for parent in extends {
            let parent_type = self.get(parent).ok_or_else(|| MetadataError::UnknownType {
                name: parent.clone(),
                location: format!("type '{name}'"),
            })?;
            for a in std::iter::once(&parent_type.name).chain(parent_type.ancestors.iter()) {
                if !ancestors.contains(a) {
                    ancestors.push(Arc::clone(a));
                }
            }
        }
        let declared = PayloadType {
            name: Arc::from(name),
            ancestors: Arc::from(ancestors),
        };
        self.types.insert(name.to_string(), declared.clone());
        Ok(declared)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PayloadType> {
        self.types.get(name)
    }

    /// Look a type up, reporting `location` on failure.
    ///
    /// # Errors
    ///
    /// [`MetadataError::UnknownType`] if `name` is not declared.
    pub fn require(&self, name: &str, location: &str) -> Result<PayloadType, MetadataError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownType {
                name: name.to_string(),
                location: location.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &PayloadType> {
        self.types.values()
    }
}

/// Transport-level protection an application requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportGuarantee {
    #[default]
    None,
    Integral,
    Confidential,
}

impl TransportGuarantee {
    /// Both `Integral` and `Confidential` need a secure transport.
    #[must_use]
    pub fn requires_secure(self) -> bool {
        !matches!(self, TransportGuarantee::None)
    }
}

/// Semantic type of a declared response header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderKind {
    #[default]
    Default,
    Date,
    Integer,
}

/// Declared value type of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
}

impl ValueType {
    /// Whether `value` is a well-formed literal of this type.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ValueType::String => true,
            ValueType::Integer => value.parse::<i64>().is_ok(),
            ValueType::Number => value.parse::<f64>().is_ok(),
            ValueType::Boolean => matches!(value, "true" | "false"),
        }
    }
}

/// A per-method request filter, evaluated against the call's parameters.
#[derive(Debug, Clone)]
pub struct Filter {
    pub name: String,
    pub value_type: ValueType,
    pub default: Option<String>,
    pub pattern: Option<NamePattern>,
    /// Name of the value generator in the generator registry.
    pub generator: String,
}

impl Filter {
    /// True if `value` satisfies the declared type and pattern.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.value_type.accepts(value) && self.pattern.as_ref().is_none_or(|p| p.is_match(value))
    }
}

/// A declared response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    pub name: String,
    pub kind: HeaderKind,
    pub default: Option<String>,
    /// Name of the header generator in the generator registry.
    pub generator: String,
}

/// Accepted request variant of a method.
#[derive(Debug, Clone)]
pub struct MethodRequest {
    pub payload_type: PayloadType,
    pub media_types: Vec<MediaType>,
}

/// Produced response variant of a method.
#[derive(Debug, Clone)]
pub struct MethodResponse {
    pub payload_type: PayloadType,
    pub media_types: Vec<MediaType>,
    pub status: u16,
    pub headers: Vec<ResponseHeader>,
}

/// One verb-like operation on a resource.
#[derive(Debug, Clone)]
pub struct ResourceMethod {
    pub application: String,
    pub resource: String,
    pub name: String,
    pub description: String,
    pub default_status: u16,
    /// Resource name a successful call redirects to with `303 See Other`.
    pub see_other: Option<String>,
    pub roles_allowed: BTreeSet<String>,
    pub interceptors: Vec<String>,
    pub filters: Vec<Filter>,
    pub headers: Vec<ResponseHeader>,
    pub requests: BTreeMap<String, Arc<MethodRequest>>,
    pub responses: BTreeMap<String, Arc<MethodResponse>>,
}

impl ResourceMethod {
    #[must_use]
    pub fn request(&self, payload_type: &str) -> Option<&Arc<MethodRequest>> {
        self.requests.get(payload_type)
    }

    #[must_use]
    pub fn response(&self, payload_type: &str) -> Option<&Arc<MethodResponse>> {
        self.responses.get(payload_type)
    }

    #[must_use]
    pub fn declares_interceptor(&self, name: &str) -> bool {
        self.interceptors.iter().any(|i| i == name)
    }

    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !self.roles_allowed.is_empty()
    }
}

/// A named, addressable entity type.
#[derive(Debug, Clone)]
pub struct Resource {
    pub application: String,
    pub name: String,
    pub description: String,
    pub template: PathTemplate,
    pub methods: BTreeMap<String, Arc<ResourceMethod>>,
}

impl Resource {
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&Arc<ResourceMethod>> {
        self.methods.get(name)
    }

    /// Declared method names, for `Allow` headers.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }
}

/// Root of the metadata graph. Built once, then shared read-only.
#[derive(Debug, Clone)]
pub struct Application {
    pub name: String,
    pub base_path: String,
    pub description: String,
    pub transport_guarantee: TransportGuarantee,
    pub resources: BTreeMap<String, Arc<Resource>>,
    pub types: TypeRegistry,
}

impl Application {
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Arc<Resource>> {
        self.resources.get(name)
    }

    /// `(resource, method)` pairs in name order.
    pub fn methods(&self) -> impl Iterator<Item = (&Arc<Resource>, &Arc<ResourceMethod>)> {
        self.resources
            .values()
            .flat_map(|r| r.methods.values().map(move |m| (r, m)))
    }

    /// One line per method: `METHOD base+template -> Resource`.
    #[must_use]
    pub fn dump(&self) -> Vec<String> {
        self.methods()
            .map(|(r, m)| {
                format!(
                    "{} {}{} -> {}",
                    m.name,
                    self.base_path.trim_end_matches('/'),
                    r.template,
                    r.name
                )
            })
            .collect()
    }
}
