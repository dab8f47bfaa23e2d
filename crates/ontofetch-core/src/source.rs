//! Import source model: which external ontologies get vendored, and where.
//!
//! Each source is an independently processed (name, URL) pair; the name
//! drives all file naming under the import directory. The canonical output
//! serialization is Turtle, so every refreshed source lands as `<name>.ttl`.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

/// File extension of the canonical serialization (Turtle).
pub const CANONICAL_EXT: &str = "ttl";

/// Extension used for the intermediate download artifact, which exists only
/// between fetch and conversion of a single source.
pub const DOWNLOAD_EXT: &str = "download";

/// One externally authored reference ontology to vendor locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSource {
    /// Unique identifier; used to name the output file.
    pub name: String,
    /// HTTP(S) location of the source document.
    pub url: String,
    /// Optional `Accept:` header value, for sources that publish multiple
    /// representations and whose default is not the one we want.
    #[serde(default)]
    pub accept: Option<String>,
}

impl ImportSource {
    /// Path of the refreshed canonical file for this source.
    pub fn canonical_path(&self, import_dir: &Path) -> PathBuf {
        import_dir.join(format!("{}.{}", self.name, CANONICAL_EXT))
    }

    /// Path of the transient download artifact for this source.
    pub fn download_path(&self, import_dir: &Path) -> PathBuf {
        import_dir.join(format!("{}.{}", self.name, DOWNLOAD_EXT))
    }
}

/// The built-in source list: DUO (published as RDF/XML under an .owl URL)
/// and PROV-O (namespace document with content negotiation; Turtle must be
/// requested explicitly).
pub fn default_sources() -> Vec<ImportSource> {
    vec![
        ImportSource {
            name: "duo".to_string(),
            url: "http://purl.obolibrary.org/obo/duo.owl".to_string(),
            accept: None,
        },
        ImportSource {
            name: "prov".to_string(),
            url: "http://www.w3.org/ns/prov-o".to_string(),
            accept: Some("text/turtle".to_string()),
        },
    ]
}

/// Validate a configured source list: names must be non-empty, filename-safe
/// and unique, and every URL must parse as http(s).
pub fn validate_sources(sources: &[ImportSource]) -> Result<()> {
    if sources.is_empty() {
        bail!("no import sources configured");
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for src in sources {
        if src.name.is_empty() {
            bail!("import source with empty name (url {})", src.url);
        }
        if src
            .name
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        {
            bail!("import source name {:?} is not filename-safe", src.name);
        }
        if !seen.insert(src.name.as_str()) {
            bail!("duplicate import source name {:?}", src.name);
        }
        let parsed = Url::parse(&src.url)
            .map_err(|e| anyhow::anyhow!("source {:?} has invalid url {:?}: {}", src.name, src.url, e))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => bail!("source {:?} has unsupported url scheme {:?}", src.name, other),
        }
    }
    Ok(())
}
