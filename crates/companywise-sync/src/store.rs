//! Per-user solved-status document stores.
//!
//! A store keeps one JSON document per user and pushes the latest version to
//! watchers. Writes use merge semantics: fields absent from the written
//! document keep their stored values.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::{DateTime, Utc};
use companywise_core::persist::write_json_atomic;
use companywise_core::{CompanywiseError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::subscription::{Listeners, Subscription};

/// The per-user progress document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solved_question_ids: Option<Vec<i64>>,
    /// Always written, as `null` when absent, so a merge clears a stale value.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// What a watcher receives.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    /// Latest stored document; `None` when the user has no document yet.
    Snapshot(Option<SolvedDocument>),
    /// The store could not deliver the document.
    Error(String),
}

pub type WatchCallback = Box<dyn Fn(&WatchEvent) + Send + Sync>;

/// Remote key-value document store keyed by user id.
pub trait DocumentStore: Send + Sync {
    /// Push the current document to `callback` now, then after every change.
    fn watch(&self, user_id: &str, callback: WatchCallback) -> Subscription;

    /// Write `document` for `user_id`. With `merge`, stored fields not present
    /// in `document` are kept; without it the stored document is replaced.
    fn upsert(&self, user_id: &str, document: &SolvedDocument, merge: bool) -> Result<()>;
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Watchers grouped by user id. A user's entry exists only while it has at
/// least one live subscription.
#[derive(Default)]
struct WatchRegistry {
    by_user: Arc<Mutex<HashMap<String, Listeners<WatchEvent>>>>,
}

type WatchMap = HashMap<String, Listeners<WatchEvent>>;

fn lock_map(map: &Mutex<WatchMap>) -> MutexGuard<'_, WatchMap> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl WatchRegistry {
    fn subscribe(&self, user_id: &str, callback: WatchCallback) -> Subscription {
        let inner = lock_map(&self.by_user)
            .entry(user_id.to_string())
            .or_default()
            .subscribe(callback);

        let registry: Weak<Mutex<WatchMap>> = Arc::downgrade(&self.by_user);
        let user_id = user_id.to_string();
        Subscription::new(move || {
            drop(inner);
            if let Some(map) = registry.upgrade() {
                let mut map = lock_map(&map);
                if map.get(&user_id).is_some_and(|listeners| listeners.is_empty()) {
                    map.remove(&user_id);
                }
            }
        })
    }

    fn notify(&self, user_id: &str, event: &WatchEvent) {
        let listeners = lock_map(&self.by_user).get(user_id).cloned();
        if let Some(listeners) = listeners {
            listeners.notify(event);
        }
    }

    #[cfg(test)]
    fn watched_users(&self) -> usize {
        lock_map(&self.by_user).len()
    }
}

/// Overlay `document` onto `existing` (merge) or replace it.
fn merge_fields(
    existing: Option<Map<String, Value>>,
    document: &SolvedDocument,
    merge: bool,
) -> Result<Map<String, Value>> {
    let patch = match serde_json::to_value(document)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let mut fields = if merge {
        existing.unwrap_or_default()
    } else {
        Map::new()
    };
    fields.extend(patch);
    Ok(fields)
}

fn decode(fields: Map<String, Value>) -> Result<SolvedDocument> {
    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn remote_err(user_id: &str, message: impl ToString) -> CompanywiseError {
    CompanywiseError::Remote {
        user_id: user_id.to_string(),
        message: message.to_string(),
    }
}

// ── DirectoryStore ────────────────────────────────────────────────────────────

/// Store keeping `<root>/<user id>.json`, one file per user.
///
/// Watchers are notified of writes made through this handle.
pub struct DirectoryStore {
    root: PathBuf,
    watchers: WatchRegistry,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            watchers: WatchRegistry::default(),
        }
    }

    /// Path of a user's document. Characters outside `[A-Za-z0-9_-]` in the
    /// id are replaced by `_`.
    pub fn document_path(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }

    fn read_fields(&self, user_id: &str) -> Result<Option<Map<String, Value>>> {
        let path = self.document_path(user_id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| remote_err(user_id, e))?;
        match serde_json::from_str(&content).map_err(|e| remote_err(user_id, e))? {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(remote_err(user_id, "stored document is not an object")),
        }
    }

    fn read(&self, user_id: &str) -> Result<Option<SolvedDocument>> {
        self.read_fields(user_id)?.map(decode).transpose()
    }

    fn write_fields(&self, user_id: &str, fields: &Map<String, Value>) -> Result<()> {
        let path = self.document_path(user_id);
        write_json_atomic(&path, fields, true).map_err(|e| remote_err(user_id, e))?;
        debug!(user = user_id, path = %path.display(), "solved document written");
        Ok(())
    }

    fn current_event(&self, user_id: &str) -> WatchEvent {
        match self.read(user_id) {
            Ok(doc) => WatchEvent::Snapshot(doc),
            Err(e) => WatchEvent::Error(e.to_string()),
        }
    }
}

impl DocumentStore for DirectoryStore {
    fn watch(&self, user_id: &str, callback: WatchCallback) -> Subscription {
        callback(&self.current_event(user_id));
        self.watchers.subscribe(user_id, callback)
    }

    fn upsert(&self, user_id: &str, document: &SolvedDocument, merge: bool) -> Result<()> {
        let existing = if merge {
            self.read_fields(user_id)?
        } else {
            None
        };
        let fields = merge_fields(existing, document, merge)?;
        self.write_fields(user_id, &fields)?;
        self.watchers
            .notify(user_id, &WatchEvent::Snapshot(Some(decode(fields)?)));
        Ok(())
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// In-process store. Can be switched offline to exercise failure paths.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Map<String, Value>>>,
    offline: AtomicBool,
    watchers: WatchRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline, watches receive [`WatchEvent::Error`] and upserts fail.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Raw stored fields for `user_id`.
    pub fn raw(&self, user_id: &str) -> Option<Map<String, Value>> {
        self.lock_documents().get(user_id).cloned()
    }

    /// Replace the stored fields for `user_id` and notify watchers, as if
    /// another client had written them.
    pub fn put_raw(&self, user_id: &str, fields: Map<String, Value>) -> Result<()> {
        let doc = decode(fields.clone())?;
        self.lock_documents().insert(user_id.to_string(), fields);
        self.watchers
            .notify(user_id, &WatchEvent::Snapshot(Some(doc)));
        Ok(())
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    fn lock_documents(&self) -> std::sync::MutexGuard<'_, HashMap<String, Map<String, Value>>> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryStore {
    fn watch(&self, user_id: &str, callback: WatchCallback) -> Subscription {
        let event = if self.is_offline() {
            WatchEvent::Error("store offline".to_string())
        } else {
            match self.raw(user_id).map(decode).transpose() {
                Ok(doc) => WatchEvent::Snapshot(doc),
                Err(e) => WatchEvent::Error(e.to_string()),
            }
        };
        callback(&event);
        self.watchers.subscribe(user_id, callback)
    }

    fn upsert(&self, user_id: &str, document: &SolvedDocument, merge: bool) -> Result<()> {
        if self.is_offline() {
            return Err(remote_err(user_id, "store offline"));
        }
        let fields = merge_fields(self.raw(user_id), document, merge)?;
        let doc = decode(fields.clone())?;
        self.lock_documents().insert(user_id.to_string(), fields);
        self.watchers
            .notify(user_id, &WatchEvent::Snapshot(Some(doc)));
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
