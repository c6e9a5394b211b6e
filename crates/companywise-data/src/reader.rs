//! Company directory discovery and timeframe file loading.
//!
//! The dataset root holds one directory per company, each containing any
//! subset of the five `<timeframe>.csv` files.

use std::path::{Path, PathBuf};

use companywise_core::csv::parse_questions;
use companywise_core::models::{Question, Timeframe};
use companywise_core::{CompanywiseError, Result};
use tracing::{debug, warn};

/// Directory names at the dataset root that are never companies.
pub const RESERVED_NAMES: &[&str] = &["src"];

/// A company directory found under the dataset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDir {
    /// Raw directory name.
    pub name: String,
    pub path: PathBuf,
}

/// `false` for hidden entries (leading `.`) and [`RESERVED_NAMES`].
pub fn is_company_dir_name(name: &str) -> bool {
    !name.starts_with('.') && !RESERVED_NAMES.contains(&name)
}

/// List the company directories directly under `root`, sorted by name.
///
/// Fails only when `root` is missing or cannot be listed. Unreadable
/// children are logged and skipped.
pub fn discover_companies(root: &Path) -> Result<Vec<CompanyDir>> {
    if !root.is_dir() {
        return Err(CompanywiseError::DataPathNotFound(root.to_path_buf()));
    }

    let mut companies = Vec::new();
    let walker = walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(CompanywiseError::Walk {
                    path: root.to_path_buf(),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_company_dir_name(&name) {
            debug!("Ignoring reserved directory {}", name);
            continue;
        }

        companies.push(CompanyDir {
            name,
            path: entry.into_path(),
        });
    }

    debug!(
        "Discovered {} company directories under {}",
        companies.len(),
        root.display()
    );
    Ok(companies)
}

/// Parse one timeframe file of a company.
///
/// Returns `None` when the file does not exist or cannot be read; a read
/// failure is logged, not raised. Invalid UTF-8 is replaced, not rejected.
pub fn load_timeframe(company_dir: &Path, timeframe: Timeframe) -> Option<Vec<Question>> {
    let path = company_dir.join(timeframe.file_name());
    if !path.exists() {
        return None;
    }

    match std::fs::read(&path) {
        Ok(bytes) => {
            let questions = parse_questions(&String::from_utf8_lossy(&bytes));
            debug!("File {}: {} questions", path.display(), questions.len());
            Some(questions)
        }
        Err(e) => {
            warn!("Failed to read file {}: {}", path.display(), e);
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
