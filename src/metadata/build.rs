use super::declare::{ApplicationDecl, FilterDecl, HeaderDecl, MethodDecl, ResourceDecl};
use super::types::{
    Application, Filter, HeaderKind, MethodRequest, MethodResponse, Resource, ResourceMethod,
    ResponseHeader, TypeRegistry, ANY_TYPE, OPTIONS_METHOD,
};
use crate::error::MetadataError;
use crate::media::MediaType;
use crate::pattern::NamePattern;
use crate::router::PathTemplate;
use crate::runtime_config::RuntimeConfig;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Validate declarations and build the immutable metadata graph.
///
/// Every malformed declaration is fatal: media types, filter patterns and path
/// templates must parse, names must be unique in their scope, every method needs at
/// least one response and every `see_other` target must name a resource.
///
/// # Errors
///
/// The first [`MetadataError`] encountered.
pub fn build_application(
    decl: &ApplicationDecl,
    config: &RuntimeConfig,
) -> Result<Application, MetadataError> {
    if decl.name.trim().is_empty() {
        return Err(MetadataError::Invalid {
            location: "application".to_string(),
            message: "name must not be empty".to_string(),
        });
    }

    let mut types = TypeRegistry::new();
    for t in &decl.types {
        types.declare(&t.name, &t.extends)?;
    }

    let mut resources = BTreeMap::new();
    for r in &decl.resources {
        if resources.contains_key(&r.name) {
            return Err(MetadataError::Duplicate {
                kind: "resource",
                name: r.name.clone(),
                owner: format!("application '{}'", decl.name),
            });
        }
        let resource = build_resource(&decl.name, r, &types, config)?;
        resources.insert(r.name.clone(), Arc::new(resource));
    }

    for resource in resources.values() {
        for method in resource.methods.values() {
            if let Some(target) = &method.see_other {
                if !resources.contains_key(target) {
                    return Err(MetadataError::Invalid {
                        location: format!("method {} on resource '{}'", method.name, resource.name),
                        message: format!("see_other target '{target}' is not a resource"),
                    });
                }
            }
        }
    }

    let app = Application {
        name: decl.name.clone(),
        base_path: normalize_base(&decl.base_path),
        description: decl.description.clone(),
        transport_guarantee: decl.transport_guarantee,
        resources,
        types,
    };

    let summary: Vec<String> = app.dump().into_iter().take(10).collect();
    info!(
        application = %app.name,
        base_path = %app.base_path,
        resources_count = app.resources.len(),
        methods_count = app.methods().count(),
        methods_summary = ?summary,
        "Application metadata built"
    );

    Ok(app)
}

fn normalize_base(base: &str) -> String {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn build_resource(
    application: &str,
    decl: &ResourceDecl,
    types: &TypeRegistry,
    config: &RuntimeConfig,
) -> Result<Resource, MetadataError> {
    if decl.name.trim().is_empty() {
        return Err(MetadataError::Invalid {
            location: format!("application '{application}'"),
            message: "resource name must not be empty".to_string(),
        });
    }
    let template = PathTemplate::compile(&decl.path)?;

    let mut methods = BTreeMap::new();
    for m in &decl.methods {
        if methods.contains_key(&m.name) {
            return Err(MetadataError::Duplicate {
                kind: "method",
                name: m.name.clone(),
                owner: format!("resource '{}'", decl.name),
            });
        }
        let method = build_method(application, &decl.name, m, types)?;
        methods.insert(m.name.clone(), Arc::new(method));
    }

    if config.implicit_options && !methods.contains_key(OPTIONS_METHOD) {
        debug!(resource = %decl.name, "Adding implicit OPTIONS method");
        methods.insert(
            OPTIONS_METHOD.to_string(),
            Arc::new(options_method(application, &decl.name, types)?),
        );
    }

    Ok(Resource {
        application: application.to_string(),
        name: decl.name.clone(),
        description: decl.description.clone(),
        template,
        methods,
    })
}

fn options_method(
    application: &str,
    resource: &str,
    types: &TypeRegistry,
) -> Result<ResourceMethod, MetadataError> {
    let location = format!("method {OPTIONS_METHOD} on resource '{resource}'");
    let response = MethodResponse {
        payload_type: types.require(ANY_TYPE, &location)?,
        media_types: vec![MediaType::json()],
        status: 200,
        headers: Vec::new(),
    };
    Ok(ResourceMethod {
        application: application.to_string(),
        resource: resource.to_string(),
        name: OPTIONS_METHOD.to_string(),
        description: "Describe this resource".to_string(),
        default_status: 200,
        see_other: None,
        roles_allowed: BTreeSet::new(),
        interceptors: Vec::new(),
        filters: Vec::new(),
        headers: Vec::new(),
        requests: BTreeMap::new(),
        responses: BTreeMap::from([(ANY_TYPE.to_string(), Arc::new(response))]),
    })
}

fn build_method(
    application: &str,
    resource: &str,
    decl: &MethodDecl,
    types: &TypeRegistry,
) -> Result<ResourceMethod, MetadataError> {
    let location = format!("method {} on resource '{resource}'", decl.name);
    if decl.name.trim().is_empty() {
        return Err(MetadataError::Invalid {
            location: format!("resource '{resource}'"),
            message: "method name must not be empty".to_string(),
        });
    }
    if !(100..=599).contains(&decl.default_status) {
        return Err(MetadataError::Invalid {
            location,
            message: format!("default_status {} is not an HTTP status", decl.default_status),
        });
    }

    let mut seen = HashSet::new();
    let mut filters = Vec::with_capacity(decl.filters.len());
    for f in &decl.filters {
        if !seen.insert(f.name.as_str()) {
            return Err(MetadataError::Duplicate {
                kind: "filter",
                name: f.name.clone(),
                owner: location.clone(),
            });
        }
        filters.push(build_filter(&location, f)?);
    }

    let headers = decl
        .headers
        .iter()
        .map(|h| build_header(&location, h))
        .collect::<Result<Vec<_>, _>>()?;

    let mut requests = BTreeMap::new();
    for req in &decl.requests {
        let payload_type = types.require(type_name(&req.payload_type), &location)?;
        if requests.contains_key(payload_type.name()) {
            return Err(MetadataError::Duplicate {
                kind: "request type",
                name: payload_type.name().to_string(),
                owner: location.clone(),
            });
        }
        let media_types = parse_media_types(&req.media_types)?;
        requests.insert(
            payload_type.name().to_string(),
            Arc::new(MethodRequest {
                payload_type,
                media_types,
            }),
        );
    }

    if decl.responses.is_empty() {
        return Err(MetadataError::MissingResponse {
            resource: resource.to_string(),
            method: decl.name.clone(),
        });
    }
    let mut responses = BTreeMap::new();
    for resp in &decl.responses {
        let payload_type = types.require(type_name(&resp.payload_type), &location)?;
        if responses.contains_key(payload_type.name()) {
            return Err(MetadataError::Duplicate {
                kind: "response type",
                name: payload_type.name().to_string(),
                owner: location.clone(),
            });
        }
        let headers = resp
            .headers
            .iter()
            .map(|h| build_header(&location, h))
            .collect::<Result<Vec<_>, _>>()?;
        responses.insert(
            payload_type.name().to_string(),
            Arc::new(MethodResponse {
                payload_type,
                media_types: parse_media_types(&resp.media_types)?,
                status: resp.status.unwrap_or(decl.default_status),
                headers,
            }),
        );
    }

    Ok(ResourceMethod {
        application: application.to_string(),
        resource: resource.to_string(),
        name: decl.name.clone(),
        description: decl.description.clone(),
        default_status: decl.default_status,
        see_other: decl.see_other.clone(),
        roles_allowed: decl.roles_allowed.iter().cloned().collect(),
        interceptors: decl.interceptors.clone(),
        filters,
        headers,
        requests,
        responses,
    })
}

fn type_name(name: &str) -> &str {
    if name.trim().is_empty() {
        ANY_TYPE
    } else {
        name
    }
}

fn parse_media_types(raw: &[String]) -> Result<Vec<MediaType>, MetadataError> {
    raw.iter()
        .map(|m| MediaType::parse(m).map_err(MetadataError::from))
        .collect()
}

fn build_filter(location: &str, decl: &FilterDecl) -> Result<Filter, MetadataError> {
    let filter_location = format!("filter '{}' of {location}", decl.name);
    let pattern = decl
        .pattern
        .as_deref()
        .map(|p| NamePattern::compile(&filter_location, p))
        .transpose()?;
    let filter = Filter {
        name: decl.name.clone(),
        value_type: decl.value_type,
        default: decl.default.clone(),
        pattern,
        generator: decl.generator.clone(),
    };
    if let Some(default) = &filter.default {
        if !filter.accepts(default) {
            return Err(MetadataError::Invalid {
                location: filter_location,
                message: format!("default value '{default}' is rejected by the filter itself"),
            });
        }
    }
    Ok(filter)
}

fn build_header(location: &str, decl: &HeaderDecl) -> Result<ResponseHeader, MetadataError> {
    if let Some(default) = &decl.default {
        let valid = match decl.kind {
            HeaderKind::Default => true,
            HeaderKind::Integer => default.trim().parse::<i64>().is_ok(),
            HeaderKind::Date => chrono::DateTime::parse_from_rfc2822(default.trim()).is_ok(),
        };
        if !valid {
            return Err(MetadataError::Invalid {
                location: format!("header '{}' of {location}", decl.name),
                message: format!("default '{default}' does not fit kind {:?}", decl.kind),
            });
        }
    }
    Ok(ResponseHeader {
        name: decl.name.clone(),
        kind: decl.kind,
        default: decl.default.clone(),
        generator: decl.generator.clone(),
    })
}
