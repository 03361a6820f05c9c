use super::build::build_application;
use super::declare::ApplicationDecl;
use super::types::Application;
use crate::runtime_config::RuntimeConfig;
use std::path::Path;

/// Serialization format of a declaration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// `.yaml`/`.yml` are YAML; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// Parse a declaration document without building it.
pub fn parse_declaration(content: &str, format: Format) -> anyhow::Result<ApplicationDecl> {
    let decl = match format {
        Format::Yaml => serde_yaml::from_str(content)?,
        Format::Json => serde_json::from_str(content)?,
    };
    Ok(decl)
}

/// Load and build an application from a YAML or JSON declaration file.
pub fn load_application(
    file_path: impl AsRef<Path>,
    config: &RuntimeConfig,
) -> anyhow::Result<Application> {
    let path = file_path.as_ref();
    let content = std::fs::read_to_string(path)?;
    load_application_from_str(&content, Format::from_path(path), config)
}

/// Build an application from an in-memory declaration document.
pub fn load_application_from_str(
    content: &str,
    format: Format,
    config: &RuntimeConfig,
) -> anyhow::Result<Application> {
    let decl = parse_declaration(content, format)?;
    Ok(build_application(&decl, config)?)
}
