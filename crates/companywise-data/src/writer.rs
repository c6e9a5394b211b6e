//! Persisting and reloading the generated [`Document`].

use std::path::Path;

use companywise_core::models::Document;
use companywise_core::persist::write_json_atomic;
use companywise_core::{CompanywiseError, Result};
use tracing::debug;

/// Write `document` to `path` as a full-file replacement.
///
/// Parent directories are created as needed. The JSON is written to a
/// sibling `.tmp` file and renamed over `path`, so readers never observe a
/// partially written document.
pub fn write_document(document: &Document, path: &Path, pretty: bool) -> Result<()> {
    let bytes = write_json_atomic(path, document, pretty).map_err(|source| {
        CompanywiseError::FileWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(
        companies = document.total_companies,
        "wrote {bytes} bytes to {}",
        path.display()
    );
    Ok(())
}

/// Read a previously generated document.
pub fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path).map_err(|source| CompanywiseError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
