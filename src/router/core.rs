use super::template::{strip_base, ParamVec};
use crate::error::ResolutionError;
use crate::metadata::{Application, Resource};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A resolved resource and the path parameters extracted from the URI.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub resource: Arc<Resource>,
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name; last write wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Owned `name -> value` pairs, convenient for building a call.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// URI → resource lookup over one application's templates.
#[derive(Debug, Clone)]
pub struct Router {
    base_path: String,
    resources: Vec<Arc<Resource>>,
}

impl Router {
    /// Build a router for `app`.
    ///
    /// Templates with more literal text are tried first so that `/movies/latest`
    /// wins over `/movies/{id}`; ties keep resource name order.
    pub fn new(app: &Application) -> Self {
        let mut resources: Vec<Arc<Resource>> = app.resources.values().map(Arc::clone).collect();
        resources.sort_by_key(|r| std::cmp::Reverse(r.template.literal_len()));

        if resources.is_empty() {
            info!(routes_count = 0, "Routing table loaded with no resources");
        } else {
            let summary: Vec<String> = resources
                .iter()
                .take(10)
                .map(|r| format!("{}{} -> {}", app.base_path, r.template, r.name))
                .collect();
            info!(
                routes_count = resources.len(),
                base_path = %app.base_path,
                routes_summary = ?summary,
                "Routing table loaded"
            );
        }

        Self {
            base_path: app.base_path.clone(),
            resources,
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Print every template to stdout.
    pub fn dump_routes(&self) {
        println!(
            "[routes] base_path={} count={}",
            self.base_path,
            self.resources.len()
        );
        for r in &self.resources {
            println!("[route] {}{} -> {}", self.base_path, r.template, r.name);
        }
    }

    /// Resolve `uri` (query string allowed) to a resource.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::PathNotMatched`] when the URI is outside the base path or
    /// fits no template.
    pub fn route(&self, uri: &str) -> Result<RouteMatch, ResolutionError> {
        debug!(uri = %uri, "Route match attempt");
        let started = Instant::now();

        let found = strip_base(&self.base_path, uri).and_then(|path| {
            self.resources
                .iter()
                .find_map(|r| r.template.match_path(path).map(|p| (r, p)))
        });
        let elapsed = started.elapsed();

        match found {
            Some((resource, path_params)) => {
                if elapsed > Duration::from_millis(1) {
                    warn!(
                        uri = %uri,
                        resource = %resource.name,
                        duration_us = elapsed.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    debug!(
                        uri = %uri,
                        resource = %resource.name,
                        path_params = ?path_params,
                        duration_us = elapsed.as_micros(),
                        "Route matched"
                    );
                }
                Ok(RouteMatch {
                    resource: Arc::clone(resource),
                    path_params,
                })
            }
            None => {
                debug!(uri = %uri, "No route matched");
                Err(ResolutionError::PathNotMatched {
                    path: uri.to_string(),
                })
            }
        }
    }
}
