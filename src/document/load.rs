use super::build::build_registry;
use super::types::SchemaDocument;
use super::SchemaRegistry;
use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Serialization format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// `.yaml`/`.yml` and `.toml` by extension, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

/// Load a schema document from disk and build its models.
pub fn load_schema_document(path: impl AsRef<Path>) -> anyhow::Result<SchemaRegistry> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema document {}", path.display()))?;
    let registry = parse_schema_document(&content, DocumentFormat::from_path(path))
        .with_context(|| format!("invalid schema document {}", path.display()))?;
    info!(
        path = %path.display(),
        models = registry.len(),
        "Loaded schema document"
    );
    Ok(registry)
}

/// Parse and build a schema document held in memory.
pub fn parse_schema_document(
    content: &str,
    format: DocumentFormat,
) -> anyhow::Result<SchemaRegistry> {
    let document: SchemaDocument = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(content)?,
        DocumentFormat::Json => serde_json::from_str(content)?,
        DocumentFormat::Toml => toml::from_str(content)?,
    };
    let registry = build_registry(&document)?;
    Ok(registry)
}
