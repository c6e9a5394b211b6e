//! Local key-value fallback for solved ids when the remote store fails.
//!
//! Entries live in one JSON object file, keyed `leetcode_solved_<uid>`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use companywise_core::persist::write_json_atomic;
use companywise_core::{CompanywiseError, Result};
use tracing::warn;

const KEY_PREFIX: &str = "leetcode_solved_";

#[derive(Debug, Clone)]
pub struct LocalFallback {
    path: PathBuf,
}

impl LocalFallback {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(user_id: &str) -> String {
        format!("{KEY_PREFIX}{user_id}")
    }

    /// Stored ids for `user_id`, or `None` if nothing usable is stored.
    pub fn load(&self, user_id: &str) -> Option<Vec<i64>> {
        self.read_entries().remove(&Self::key(user_id))
    }

    /// Replace the stored ids for `user_id`, keeping other users' entries.
    pub fn save(&self, user_id: &str, ids: &[i64]) -> Result<()> {
        let mut entries = self.read_entries();
        entries.insert(Self::key(user_id), ids.to_vec());

        write_json_atomic(&self.path, &entries, true).map_err(|source| {
            CompanywiseError::FileWrite {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(())
    }

    fn read_entries(&self) -> BTreeMap<String, Vec<i64>> {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring unreadable fallback file {}: {e}", self.path.display());
            BTreeMap::new()
        })
    }
}
