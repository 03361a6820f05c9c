//! # Linter Module
//!
//! Startup checks over a built [`Application`] and the runtime registries that
//! serve it. Nothing here is fatal: malformed declarations are already rejected
//! by [`crate::metadata::build_application`]; the linter reports what is
//! well-formed but will misbehave at call time.
//!
//! ## Checks Performed
//!
//! 1. **Codec coverage** - every declared request/response media type resolves to
//!    exactly one reader/writer (warning when none, error when ambiguous)
//! 2. **Executor coverage** - methods only the default executor answers (info)
//! 3. **Generators** - filters and headers naming an unregistered generator (warning)
//! 4. **Templates** - two resources with the same URI template (warning)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use declarest::linter::{lint_application, print_lint_issues};
//!
//! let issues = lint_application(&app, &codecs, &dispatcher, dispatcher.generators());
//! print_lint_issues(&issues);
//! ```

use crate::codec::CodecRegistry;
use crate::dispatcher::{CallTarget, Dispatcher};
use crate::error::ResolutionError;
use crate::generators::GeneratorRegistry;
use crate::media::MediaType;
use crate::metadata::{Application, PayloadType, Resource, ResourceMethod, OPTIONS_METHOD};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

#[cfg(test)]
mod tests;

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Calls will fail at runtime
    Error,
    /// Likely misconfiguration
    Warning,
    /// Worth knowing
    Info,
}

impl LintSeverity {
    fn rank(self) -> u8 {
        match self {
            LintSeverity::Info => 0,
            LintSeverity::Warning => 1,
            LintSeverity::Error => 2,
        }
    }

    /// True if `self` is at least as severe as `other`.
    #[must_use]
    pub fn is_at_least(self, other: LintSeverity) -> bool {
        self.rank() >= other.rank()
    }
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LintSeverity::Error => "error",
            LintSeverity::Warning => "warning",
            LintSeverity::Info => "info",
        })
    }
}

/// A lint issue found in an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintIssue {
    /// Where the issue occurred (e.g. "Movie/GET/response:Movie")
    pub location: String,
    pub severity: LintSeverity,
    /// Type of lint issue (e.g. "missing_writer", "unknown_generator")
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the issue
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Lint `app` against the registries that will serve it.
pub fn lint_application(
    app: &Application,
    codecs: &CodecRegistry,
    dispatcher: &Dispatcher,
    generators: &GeneratorRegistry,
) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    for (resource, method) in app.methods() {
        let location = format!("{}/{}", resource.name, method.name);
        lint_codecs(&mut issues, &location, method, codecs);
        lint_executor(&mut issues, &location, app, resource, method, dispatcher);
        lint_generators(&mut issues, &location, method, generators);
    }
    lint_templates(&mut issues, app);

    for issue in &issues {
        match issue.severity {
            LintSeverity::Error | LintSeverity::Warning => warn!(
                severity = %issue.severity,
                kind = %issue.kind,
                location = %issue.location,
                message = %issue.message,
                "Lint issue"
            ),
            LintSeverity::Info => info!(
                kind = %issue.kind,
                location = %issue.location,
                message = %issue.message,
                "Lint note"
            ),
        }
    }
    issues
}

fn lint_codecs(
    issues: &mut Vec<LintIssue>,
    location: &str,
    method: &ResourceMethod,
    codecs: &CodecRegistry,
) {
    for request in method.requests.values() {
        let at = format!("{location}/request:{}", request.payload_type);
        for media_type in &request.media_types {
            let result = codecs.resolve_reader(&request.payload_type, media_type, None);
            check_codec(issues, &at, "reader", result.map(|_| ()), &request.payload_type, media_type);
        }
    }
    for response in method.responses.values() {
        let at = format!("{location}/response:{}", response.payload_type);
        for media_type in &response.media_types {
            let result = codecs.resolve_writer(&response.payload_type, media_type, None);
            check_codec(issues, &at, "writer", result.map(|_| ()), &response.payload_type, media_type);
        }
    }
}

fn check_codec(
    issues: &mut Vec<LintIssue>,
    location: &str,
    kind: &str,
    result: Result<(), ResolutionError>,
    payload_type: &PayloadType,
    media_type: &MediaType,
) {
    match result {
        Ok(()) => {}
        Err(ResolutionError::MediaTypeAmbiguous { candidates, .. }) => issues.push(
            LintIssue::new(
                location,
                LintSeverity::Error,
                format!("ambiguous_{kind}"),
                format!(
                    "{} {kind}s qualify for '{payload_type}' as {media_type}: {}",
                    candidates.len(),
                    candidates.join(", ")
                ),
            )
            .with_suggestion("Give the registrations distinct versions or narrower media types"),
        ),
        Err(_) => issues.push(
            LintIssue::new(
                location,
                LintSeverity::Warning,
                format!("missing_{kind}"),
                format!("no {kind} handles '{payload_type}' as {media_type}"),
            )
            .with_suggestion(format!("Register a {kind} for '{payload_type}' or a supertype")),
        ),
    }
}

fn lint_executor(
    issues: &mut Vec<LintIssue>,
    location: &str,
    app: &Application,
    resource: &Resource,
    method: &ResourceMethod,
    dispatcher: &Dispatcher,
) {
    let Some(response_type) = method.responses.keys().next() else {
        return;
    };
    let target = CallTarget {
        application: &app.name,
        resource: &resource.name,
        method: &method.name,
        response_type,
        request_type: method.requests.keys().next().map(String::as_str),
    };
    if dispatcher.resolve_executor(&target).is_default && method.name != OPTIONS_METHOD {
        issues.push(
            LintIssue::new(
                location,
                LintSeverity::Info,
                "default_executor",
                "no executor is registered; calls are answered by the default executor",
            )
            .with_suggestion(format!(
                "Register an executor matching resource '{}' and method {}",
                resource.name, method.name
            )),
        );
    }
}

fn lint_generators(
    issues: &mut Vec<LintIssue>,
    location: &str,
    method: &ResourceMethod,
    generators: &GeneratorRegistry,
) {
    for filter in &method.filters {
        if !generators.has_value_generator(&filter.generator) {
            issues.push(unknown_generator(
                format!("{location}/filter:{}", filter.name),
                &filter.generator,
            ));
        }
    }
    let headers = method
        .headers
        .iter()
        .map(|h| (location.to_string(), h))
        .chain(method.responses.values().flat_map(|r| {
            r.headers
                .iter()
                .map(move |h| (format!("{location}/response:{}", r.payload_type), h))
        }));
    for (at, header) in headers {
        if !generators.has_header_generator(&header.generator) {
            issues.push(unknown_generator(format!("{at}/header:{}", header.name), &header.generator));
        }
    }
}

fn unknown_generator(location: String, generator: &str) -> LintIssue {
    LintIssue::new(
        location,
        LintSeverity::Warning,
        "unknown_generator",
        format!("generator '{generator}' is not registered; the declared default is used"),
    )
    .with_suggestion("Register the generator or use one of: default, now, call-id")
}

fn lint_templates(issues: &mut Vec<LintIssue>, app: &Application) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for resource in app.resources.values() {
        let template = resource.template.as_str();
        if let Some(first) = seen.insert(template, &resource.name) {
            issues.push(LintIssue::new(
                resource.name.as_str(),
                LintSeverity::Warning,
                "duplicate_template",
                format!("template '{template}' is also used by resource '{first}'; only one is reachable"),
            ));
        }
    }
}

/// Count issues at or above `severity`.
#[must_use]
pub fn count_at_least(issues: &[LintIssue], severity: LintSeverity) -> usize {
    issues
        .iter()
        .filter(|i| i.severity.is_at_least(severity))
        .count()
}

/// Print lint issues in a formatted way
pub fn print_lint_issues(issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ No lint issues found!");
        return;
    }

    let by = |severity: LintSeverity| -> Vec<&LintIssue> {
        issues.iter().filter(|i| i.severity == severity).collect()
    };
    let errors = by(LintSeverity::Error);
    let warnings = by(LintSeverity::Warning);
    let infos = by(LintSeverity::Info);

    println!("\n📋 Lint Results:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        errors.len(),
        warnings.len(),
        infos.len()
    );

    for (title, group) in [
        ("❌ Errors (must fix):", errors),
        ("⚠️  Warnings (should fix):", warnings),
        ("ℹ️  Info:", infos),
    ] {
        if group.is_empty() {
            continue;
        }
        println!("{title}");
        for issue in group {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}
