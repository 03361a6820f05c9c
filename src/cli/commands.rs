use crate::codec::CodecRegistry;
use crate::dispatcher::Dispatcher;
use crate::linter::{count_at_least, lint_application, print_lint_issues, LintSeverity};
use crate::metadata::{load_application, Application};
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for declarest
#[derive(Parser, Debug)]
#[command(name = "declarest")]
#[command(about = "Inspect, lint and route declarative REST applications", long_about = None)]
pub struct Cli {
    /// Log level for diagnostics (trace/debug/info/warn/error)
    #[arg(long, global = true, env = "DECLAREST_LOG_LEVEL", default_value = "error")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the resources and methods of a declaration file
    Inspect {
        /// Declaration file (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Print the application descriptor as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Lint a declaration file against the built-in codecs and generators
    ///
    /// Reports media types no reader/writer handles, ambiguous codecs,
    /// unknown generators and duplicate templates.
    Lint {
        /// Declaration file (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Fail on warnings as well as errors
        #[arg(long, default_value_t = false)]
        fail_on_warning: bool,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Resolve a URI against the declared templates
    Match {
        /// Declaration file (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Request URI, including the application base path
        #[arg(short, long)]
        uri: String,

        /// Also check that the method is declared on the matched resource
        #[arg(short, long)]
        method: Option<String>,
    },
}

fn load(file: &Path) -> anyhow::Result<Application> {
    load_application(file, &RuntimeConfig::from_env())
        .with_context(|| format!("failed to load declarations from {}", file.display()))
}

/// Execute `cli`, writing results to `out`.
///
/// Returns `Ok(false)` when the command ran but its check failed (lint findings
/// over the threshold, an unmatched URI or undeclared method).
///
/// # Errors
///
/// If the declaration file cannot be read or is invalid, or `out` fails.
pub fn run_cli(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Inspect { file, json } => {
            let app = load(file)?;
            if *json {
                serde_json::to_writer_pretty(&mut *out, &app.describe())?;
                writeln!(out)?;
            } else {
                writeln!(out, "{} ({} resources)", app.name, app.resources.len())?;
                for line in app.dump() {
                    writeln!(out, "  {line}")?;
                }
            }
            Ok(true)
        }
        Commands::Lint {
            file,
            fail_on_warning,
            errors_only,
        } => {
            let config = RuntimeConfig::from_env();
            let app = Arc::new(load(file)?);
            let codecs = CodecRegistry::with_builtin_codecs(config.resolver_cache)?;
            let dispatcher = Dispatcher::new(Arc::clone(&app));
            let mut issues = lint_application(&app, &codecs, &dispatcher, dispatcher.generators());
            if *errors_only {
                issues.retain(|i| i.severity == LintSeverity::Error);
            }
            print_lint_issues(&issues);

            let threshold = if *fail_on_warning {
                LintSeverity::Warning
            } else {
                LintSeverity::Error
            };
            let failing = count_at_least(&issues, threshold);
            writeln!(out, "{} issue(s), {failing} at or above {threshold}", issues.len())?;
            Ok(failing == 0)
        }
        Commands::Match { file, uri, method } => {
            let app = load(file)?;
            let router = Router::new(&app);
            let route = match router.route(uri) {
                Ok(route) => route,
                Err(e) => {
                    writeln!(out, "no match: {e}")?;
                    return Ok(false);
                }
            };
            writeln!(out, "resource: {}", route.resource.name)?;
            writeln!(out, "template: {}", route.resource.template)?;
            for (name, value) in route.params() {
                writeln!(out, "  {name} = {value}")?;
            }
            if let Some(method) = method {
                if route.resource.method(method).is_none() {
                    let allowed = route.resource.allowed_methods().join(", ");
                    writeln!(out, "method {method} not allowed (allowed: {allowed})")?;
                    return Ok(false);
                }
                writeln!(out, "method: {method}")?;
            }
            Ok(true)
        }
    }
}
