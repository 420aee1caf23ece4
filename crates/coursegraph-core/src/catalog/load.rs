//! Reading scraped catalog files.
//!
//! A catalog file maps each course code to its list of requirements:
//!
//! ```json
//! {
//!   "CS 201": [["CS 100", "prereq"], ["MATH 151", "coreq"]],
//!   "CS 100": []
//! }
//! ```
//!
//! Requirements may also be written as `{ "code": "CS 100", "kind": "prereq" }`
//! or as a bare code (prerequisite). JSON and YAML are supported, chosen by
//! file extension. Several files (typically one per subject) are merged in
//! order with [`load_catalogs`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, instrument};

use crate::catalog::{Catalog, CatalogBuilder};
use crate::course::CodeStyle;
use crate::error::ErrorCode;

/// Catalog file contents before normalization.
pub type RawCatalog = BTreeMap<String, Vec<RawRelation>>;

/// One requirement entry as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawRelation {
    /// `["CS 100", "prereq"]`
    Pair(String, Option<String>),
    /// `{ "code": "CS 100", "kind": "prereq" }`
    Entry {
        code: String,
        #[serde(default)]
        kind: Option<String>,
    },
    /// `"CS 100"`
    Bare(String),
}

impl RawRelation {
    /// Split into `(code, kind label)`. A missing kind reads as `prereq`.
    #[must_use]
    pub fn into_pair(self) -> (String, String) {
        match self {
            Self::Pair(code, kind) | Self::Entry { code, kind } => {
                (code, kind.unwrap_or_else(|| "prereq".to_string()))
            }
            Self::Bare(code) => (code, "prereq".to_string()),
        }
    }
}

/// Errors raised while loading catalog files.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse JSON catalog {}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse YAML catalog {}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("unsupported catalog format for {} (expected .json, .yaml or .yml)", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

impl CatalogError {
    /// Stable user-facing code for this failure.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::CatalogNotFound,
            Self::Json { .. } | Self::Yaml { .. } => ErrorCode::CatalogParseError,
            Self::UnsupportedFormat { .. } => ErrorCode::UnsupportedCatalogFormat,
        }
    }
}

/// Catalog file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    /// Pick the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse catalog text in the given format.
///
/// # Errors
///
/// Returns [`CatalogError::Json`] or [`CatalogError::Yaml`] when the text is
/// not a mapping of course codes to requirement lists. `path` is only used
/// for error messages.
pub fn parse_catalog(
    content: &str,
    format: CatalogFormat,
    path: &Path,
) -> Result<RawCatalog, CatalogError> {
    match format {
        CatalogFormat::Json => serde_json::from_str(content).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        }),
        CatalogFormat::Yaml => serde_yaml::from_str(content).map_err(|source| CatalogError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read and parse a single catalog file.
///
/// # Errors
///
/// Returns an error if the extension is not recognised, the file cannot be
/// read, or its contents do not parse.
pub fn load_catalog_file(path: &Path) -> Result<RawCatalog, CatalogError> {
    let format = CatalogFormat::from_path(path).ok_or_else(|| CatalogError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_catalog(&content, format, path)
}

/// Load and merge several catalog files into one [`Catalog`].
///
/// Files are merged in order; a course listed again in a later file replaces
/// the earlier entry.
///
/// # Errors
///
/// Returns the first [`CatalogError`] encountered.
#[instrument(skip(paths), fields(files = paths.len()))]
pub fn load_catalogs(paths: &[PathBuf], style: CodeStyle) -> Result<Catalog, CatalogError> {
    let mut builder = CatalogBuilder::new(style);
    for path in paths {
        let raw = load_catalog_file(path)?;
        info!(path = %path.display(), courses = raw.len(), "loaded catalog file");
        builder.merge(raw);
    }
    let catalog = builder.build();
    info!(
        nodes = catalog.node_count(),
        edges = catalog.edge_count(),
        hash = catalog.content_hash(),
        "catalog ready"
    );
    Ok(catalog)
}
