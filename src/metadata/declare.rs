//! Serde records mirroring the declaration file format.
//!
//! These are plain data: nothing here is validated. [`super::build_application`]
//! turns a [`ApplicationDecl`] into the immutable [`super::Application`] graph.

use super::types::{HeaderKind, TransportGuarantee, ValueType};
use serde::{Deserialize, Serialize};

fn default_generator() -> String {
    crate::generators::DEFAULT_GENERATOR.to_string()
}

fn default_status() -> u16 {
    200
}

/// Top-level declaration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationDecl {
    pub name: String,
    pub base_path: String,
    pub description: String,
    pub transport_guarantee: TransportGuarantee,
    /// Payload types, declared parents first.
    pub types: Vec<TypeDecl>,
    pub resources: Vec<ResourceDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDecl {
    pub name: String,
    pub extends: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDecl {
    pub name: String,
    pub description: String,
    /// URI template relative to the application base path.
    pub path: String,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodDecl {
    pub name: String,
    pub description: String,
    #[serde(default = "default_status")]
    pub default_status: u16,
    pub see_other: Option<String>,
    pub roles_allowed: Vec<String>,
    pub interceptors: Vec<String>,
    pub filters: Vec<FilterDecl>,
    pub headers: Vec<HeaderDecl>,
    pub requests: Vec<RequestDecl>,
    pub responses: Vec<ResponseDecl>,
}

impl Default for MethodDecl {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            default_status: default_status(),
            see_other: None,
            roles_allowed: Vec::new(),
            interceptors: Vec::new(),
            filters: Vec::new(),
            headers: Vec::new(),
            requests: Vec::new(),
            responses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub default: Option<String>,
    pub pattern: Option<String>,
    #[serde(default = "default_generator")]
    pub generator: String,
}

impl Default for FilterDecl {
    fn default() -> Self {
        Self {
            name: String::new(),
            value_type: ValueType::default(),
            default: None,
            pattern: None,
            generator: default_generator(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderDecl {
    pub name: String,
    pub kind: HeaderKind,
    pub default: Option<String>,
    #[serde(default = "default_generator")]
    pub generator: String,
}

impl Default for HeaderDecl {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: HeaderKind::default(),
            default: None,
            generator: default_generator(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDecl {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub media_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseDecl {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub media_types: Vec<String>,
    /// Falls back to the method's `default_status`.
    pub status: Option<u16>,
    pub headers: Vec<HeaderDecl>,
}

impl Default for ResponseDecl {
    fn default() -> Self {
        Self {
            payload_type: crate::metadata::ANY_TYPE.to_string(),
            media_types: Vec::new(),
            status: None,
            headers: Vec::new(),
        }
    }
}
