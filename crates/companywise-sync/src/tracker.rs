//! Solved-status state for the signed-in user.
//!
//! [`ProgressTracker`] follows an [`AuthProvider`]: signing in starts a watch
//! on the user's remote document, signing out clears everything. Toggles are
//! applied locally first and then written to the store; a failed write falls
//! back to [`LocalFallback`] and the toggle still counts as done.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::auth::{AuthProvider, AuthState, UserIdentity};
use crate::fallback::LocalFallback;
use crate::store::{DocumentStore, SolvedDocument, WatchEvent};
use crate::subscription::{Listeners, Subscription};

/// Snapshot published to `on_change` listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub user: Option<UserIdentity>,
    pub solved: HashSet<i64>,
}

impl ProgressState {
    /// Solved ids in ascending order.
    pub fn sorted_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.solved.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

struct TrackerInner {
    store: Arc<dyn DocumentStore>,
    fallback: LocalFallback,
    state: Mutex<ProgressState>,
    listeners: Listeners<ProgressState>,
    watch: Mutex<Option<Subscription>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TrackerInner {
    fn snapshot(&self) -> ProgressState {
        lock(&self.state).clone()
    }

    fn publish(&self) {
        let state = self.snapshot();
        self.listeners.notify(&state);
    }

    fn handle_auth_change(self: &Arc<Self>, auth: &AuthState) {
        // Old watch goes first so its events cannot land on the new user.
        let previous = lock(&self.watch).take();
        drop(previous);

        let Some(user) = auth else {
            {
                let mut state = lock(&self.state);
                state.user = None;
                state.solved.clear();
            }
            debug!("signed out; solved set cleared");
            self.publish();
            return;
        };

        {
            let mut state = lock(&self.state);
            let same_user = state.user.as_ref().is_some_and(|u| u.uid == user.uid);
            if !same_user {
                state.solved.clear();
            }
            state.user = Some(user.clone());
        }
        self.publish();

        let weak: Weak<TrackerInner> = Arc::downgrade(self);
        let uid = user.uid.clone();
        let subscription = self.store.watch(
            &user.uid,
            Box::new(move |event: &WatchEvent| {
                if let Some(inner) = weak.upgrade() {
                    inner.apply_watch_event(&uid, event);
                }
            }),
        );
        *lock(&self.watch) = Some(subscription);
    }

    fn apply_watch_event(&self, uid: &str, event: &WatchEvent) {
        match event {
            WatchEvent::Snapshot(document) => {
                let Some(ids) = document
                    .as_ref()
                    .and_then(|d| d.solved_question_ids.as_ref())
                else {
                    return;
                };
                if self.replace_solved(uid, ids) {
                    debug!(user = uid, solved = ids.len(), "remote solved ids applied");
                    self.publish();
                }
            }
            WatchEvent::Error(message) => {
                error!(user = uid, "solved-status watch failed: {message}");
                if let Some(ids) = self.fallback.load(uid) {
                    if self.replace_solved(uid, &ids) {
                        info!(user = uid, solved = ids.len(), "loaded solved ids from local fallback");
                        self.publish();
                    }
                }
            }
        }
    }

    /// Replace the solved set if `uid` is still the signed-in user.
    fn replace_solved(&self, uid: &str, ids: &[i64]) -> bool {
        let mut state = lock(&self.state);
        if state.user.as_ref().map(|u| u.uid.as_str()) != Some(uid) {
            return false;
        }
        state.solved = ids.iter().copied().collect();
        true
    }
}

// ── ProgressTracker ───────────────────────────────────────────────────────────

/// Shared handle; clones observe the same state.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<TrackerInner>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn DocumentStore>, fallback: LocalFallback) -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                store,
                fallback,
                state: Mutex::new(ProgressState::default()),
                listeners: Listeners::new(),
                watch: Mutex::new(None),
            }),
        }
    }

    /// Follow `auth`. The tracker reacts to auth changes until the returned
    /// subscription is dropped.
    pub fn bind(&self, auth: &dyn AuthProvider) -> Subscription {
        let weak = Arc::downgrade(&self.inner);
        auth.on_auth_state_changed(Box::new(move |state: &AuthState| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_auth_change(state);
            }
        }))
    }

    /// Register for state changes (sign-in, sign-out, remote updates, toggles).
    pub fn on_change(
        &self,
        callback: impl Fn(&ProgressState) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.listeners.subscribe(callback)
    }

    pub fn state(&self) -> ProgressState {
        self.inner.snapshot()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        lock(&self.inner.state).user.clone()
    }

    pub fn solved(&self) -> HashSet<i64> {
        lock(&self.inner.state).solved.clone()
    }

    pub fn is_solved(&self, question_id: i64) -> bool {
        lock(&self.inner.state).solved.contains(&question_id)
    }

    /// Flip `question_id` for the signed-in user.
    ///
    /// Returns `false` when nobody is signed in. Otherwise the local set is
    /// updated and published, the document is upserted with merge, and on a
    /// store failure the ids go to the local fallback instead. Either way the
    /// toggle is reported as done.
    pub fn toggle_solved(&self, question_id: i64) -> bool {
        let (user, ids) = {
            let mut state = lock(&self.inner.state);
            let Some(user) = state.user.clone() else {
                return false;
            };
            if !state.solved.remove(&question_id) {
                state.solved.insert(question_id);
            }
            (user, state.sorted_ids())
        };
        self.inner.publish();

        let document = SolvedDocument {
            solved_question_ids: Some(ids.clone()),
            email: user.email.clone(),
            updated_at: Some(Utc::now()),
        };
        if let Err(e) = self.inner.store.upsert(&user.uid, &document, true) {
            error!(user = %user.uid, "failed to save solved status: {e}");
            if let Err(e) = self.inner.fallback.save(&user.uid, &ids) {
                error!(user = %user.uid, "failed to save local fallback: {e}");
            }
        }
        true
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
