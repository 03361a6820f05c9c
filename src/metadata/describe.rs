//! Machine-readable capability listing over the metadata graph.

use super::types::{
    Application, Filter, HeaderKind, MethodRequest, MethodResponse, Resource, ResourceMethod,
    ResponseHeader, TransportGuarantee, ValueType,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDescriptor {
    pub name: String,
    pub base_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub transport_guarantee: TransportGuarantee,
    pub resources: Vec<ResourceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub methods: Vec<MethodDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub default_status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub see_other: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles_allowed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interceptors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requests: Vec<VariantDescriptor>,
    pub responses: Vec<VariantDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderDescriptor {
    pub name: String,
    pub kind: HeaderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// One request or response variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub media_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderDescriptor>,
}

impl Application {
    #[must_use]
    pub fn describe(&self) -> ApplicationDescriptor {
        ApplicationDescriptor {
            name: self.name.clone(),
            base_path: self.base_path.clone(),
            description: self.description.clone(),
            transport_guarantee: self.transport_guarantee,
            resources: self.resources.values().map(|r| r.describe()).collect(),
        }
    }
}

impl Resource {
    #[must_use]
    pub fn describe(&self) -> ResourceDescriptor {
        ResourceDescriptor {
            name: self.name.clone(),
            path: self.template.as_str().to_string(),
            description: self.description.clone(),
            methods: self.methods.values().map(|m| m.describe()).collect(),
        }
    }
}

impl ResourceMethod {
    #[must_use]
    pub fn describe(&self) -> MethodDescriptor {
        MethodDescriptor {
            name: self.name.clone(),
            description: self.description.clone(),
            default_status: self.default_status,
            see_other: self.see_other.clone(),
            roles_allowed: self.roles_allowed.iter().cloned().collect(),
            interceptors: self.interceptors.clone(),
            filters: self.filters.iter().map(describe_filter).collect(),
            headers: self.headers.iter().map(describe_header).collect(),
            requests: self.requests.values().map(|r| describe_request(r)).collect(),
            responses: self.responses.values().map(|r| describe_response(r)).collect(),
        }
    }
}

fn describe_filter(f: &Filter) -> FilterDescriptor {
    FilterDescriptor {
        name: f.name.clone(),
        value_type: f.value_type,
        default: f.default.clone(),
        pattern: f.pattern.as_ref().map(|p| p.as_str().to_string()),
    }
}

fn describe_header(h: &ResponseHeader) -> HeaderDescriptor {
    HeaderDescriptor {
        name: h.name.clone(),
        kind: h.kind,
        default: h.default.clone(),
    }
}

fn describe_request(r: &MethodRequest) -> VariantDescriptor {
    VariantDescriptor {
        payload_type: r.payload_type.name().to_string(),
        media_types: r.media_types.iter().map(ToString::to_string).collect(),
        status: None,
        headers: Vec::new(),
    }
}

fn describe_response(r: &MethodResponse) -> VariantDescriptor {
    VariantDescriptor {
        payload_type: r.payload_type.name().to_string(),
        media_types: r.media_types.iter().map(ToString::to_string).collect(),
        status: Some(r.status),
        headers: r.headers.iter().map(describe_header).collect(),
    }
}
