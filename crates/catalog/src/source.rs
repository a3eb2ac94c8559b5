//! Template sources: explicit files and curated catalog identifiers.

use std::path::{Path, PathBuf};

use xe_domain::error::{Error, Result};
use xe_domain::trace::TraceEvent;

/// File extension every catalog template carries.
pub const CATALOG_EXTENSION: &str = "xml";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Source specs (unresolved)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One requested template, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// An explicit template file on disk.
    File(PathBuf),
    /// A curated catalog template addressed by identifier.
    Catalog(String),
}

impl SourceSpec {
    /// Resolve to a concrete readable location.
    ///
    /// Catalog identifiers fail with [`Error::UnknownTemplate`] when
    /// `<root>/<identifier>.xml` does not exist; file specs never fail
    /// here — a missing file surfaces when the bytes are read.
    pub fn resolve(&self, catalog_root: &Path) -> Result<TemplateSource> {
        match self {
            Self::File(path) => Ok(TemplateSource::from_file(path.clone())),
            Self::Catalog(identifier) => TemplateSource::from_catalog(catalog_root, identifier),
        }
    }

    /// Target string used in failure outcomes.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Catalog(identifier) => identifier.clone(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolved sources
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A resolved template source: a concrete location plus the input used
/// for session-name derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    File { path: PathBuf },
    Catalog { identifier: String, path: PathBuf },
}

impl TemplateSource {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    /// Resolve a catalog identifier against the catalog root.
    ///
    /// The catalog is flat: `<root>/<identifier>.xml`.
    pub fn from_catalog(root: &Path, identifier: &str) -> Result<Self> {
        let path = root.join(format!("{identifier}.{CATALOG_EXTENSION}"));
        if !path.is_file() {
            return Err(Error::UnknownTemplate(identifier.to_string()));
        }
        TraceEvent::TemplateResolved {
            identifier: identifier.to_string(),
            path: path.display().to_string(),
        }
        .emit();
        Ok(Self::Catalog {
            identifier: identifier.to_string(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::File { path } | Self::Catalog { path, .. } => path,
        }
    }

    /// The session name used when the caller supplies none: the catalog
    /// identifier, or the file's base name without extension.
    pub fn derived_name(&self) -> String {
        match self {
            Self::Catalog { identifier, .. } => identifier.clone(),
            Self::File { path } => match path.file_stem() {
                Some(stem) => stem.to_string_lossy().into_owned(),
                None => path.to_string_lossy().into_owned(),
            },
        }
    }

    /// Target string used in failure outcomes.
    pub fn describe(&self) -> String {
        match self {
            Self::File { path } => path.display().to_string(),
            Self::Catalog { identifier, .. } => identifier.clone(),
        }
    }

    /// Read the raw document bytes.
    pub fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(self.path()).map_err(Error::Io)
    }
}
