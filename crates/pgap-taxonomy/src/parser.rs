//! YAML/JSON taxonomy loading.
//!
//! The format is chosen by file extension. Both formats accept either a bare
//! list of domains or a `{version, domains}` mapping; the shape is detected
//! on the generic value tree before typed deserialization so that schema
//! errors point at the real problem instead of an untagged-enum mismatch.

use std::path::{Path, PathBuf};

use crate::error::{TaxonomyError, TaxonomyResult};
use crate::model::Taxonomy;
use crate::payload::{DomainPayload, TaxonomyPayload};

const INLINE_SOURCE: &str = "<inline>";

/// Supported payload encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// YAML 1.2 (`.yaml`, `.yml`).
    Yaml,
    /// JSON (`.json`).
    Json,
}

impl PayloadFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load, validate, and build a taxonomy from a file.
pub fn load_taxonomy(path: &Path) -> TaxonomyResult<Taxonomy> {
    let format = PayloadFormat::from_path(path).ok_or_else(|| TaxonomyError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TaxonomyError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            TaxonomyError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let payload = parse_payload(&content, format, path)?;
    tracing::info!(path = %path.display(), "loading taxonomy");
    Taxonomy::from_payload(payload)
}

/// Build a taxonomy from a YAML string.
pub fn taxonomy_from_yaml_str(content: &str) -> TaxonomyResult<Taxonomy> {
    let payload = parse_payload(content, PayloadFormat::Yaml, Path::new(INLINE_SOURCE))?;
    Taxonomy::from_payload(payload)
}

/// Build a taxonomy from a JSON string.
pub fn taxonomy_from_json_str(content: &str) -> TaxonomyResult<Taxonomy> {
    let payload = parse_payload(content, PayloadFormat::Json, Path::new(INLINE_SOURCE))?;
    Taxonomy::from_payload(payload)
}

/// Parse a payload without validating it.
pub fn parse_payload(
    content: &str,
    format: PayloadFormat,
    source: &Path,
) -> TaxonomyResult<TaxonomyPayload> {
    match format {
        PayloadFormat::Yaml => {
            let yaml_err = |e| TaxonomyError::YamlParse {
                path: PathBuf::from(source),
                source: e,
            };
            let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(yaml_err)?;
            if value.is_sequence() {
                let domains: Vec<DomainPayload> =
                    serde_yaml::from_value(value).map_err(yaml_err)?;
                Ok(TaxonomyPayload::from(domains))
            } else {
                serde_yaml::from_value(value).map_err(yaml_err)
            }
        }
        PayloadFormat::Json => {
            let json_err = |e| TaxonomyError::JsonParse {
                path: PathBuf::from(source),
                source: e,
            };
            let value: serde_json::Value = serde_json::from_str(content).map_err(json_err)?;
            if value.is_array() {
                let domains: Vec<DomainPayload> =
                    serde_json::from_value(value).map_err(json_err)?;
                Ok(TaxonomyPayload::from(domains))
            } else {
                serde_json::from_value(value).map_err(json_err)
            }
        }
    }
}
