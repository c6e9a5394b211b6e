//! Authentication collaborator contract and a local implementation.

use std::sync::{Arc, Mutex};

use companywise_core::{CompanywiseError, Result};
use serde::{Deserialize, Serialize};

use crate::subscription::{Listeners, Subscription};

/// The signed-in user as seen by the rest of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uid: String,
    pub name: String,
    pub email: Option<String>,
    pub photo: Option<String>,
}

impl UserIdentity {
    /// Build an identity, deriving `name` from `display_name`, then the local
    /// part of `email`, then `"User"`.
    pub fn new(uid: impl Into<String>, display_name: Option<&str>, email: Option<&str>) -> Self {
        let name = display_name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                email
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string());
        Self {
            uid: uid.into(),
            name,
            email: email.map(str::to_string),
            photo: None,
        }
    }
}

/// `Some(user)` while signed in, `None` otherwise.
pub type AuthState = Option<UserIdentity>;

pub type AuthCallback = Box<dyn Fn(&AuthState) + Send + Sync>;

/// Sign-in provider.
pub trait AuthProvider {
    /// Run the provider's sign-in flow and return the resulting identity.
    fn sign_in_interactive(&self) -> Result<UserIdentity>;

    fn sign_out(&self) -> Result<()>;

    /// Register for auth state changes. The callback is invoked once
    /// immediately with the current state and again after every change.
    fn on_auth_state_changed(&self, callback: AuthCallback) -> Subscription;
}

/// Provider backed by a fixed, locally configured identity.
///
/// `sign_in_interactive` succeeds with the configured identity, or fails with
/// [`CompanywiseError::NoIdentity`] when none was configured.
pub struct LocalAuth {
    identity: Option<UserIdentity>,
    current: Arc<Mutex<AuthState>>,
    listeners: Listeners<AuthState>,
}

impl LocalAuth {
    pub fn new(identity: Option<UserIdentity>) -> Self {
        Self {
            identity,
            current: Arc::new(Mutex::new(None)),
            listeners: Listeners::new(),
        }
    }

    pub fn current_user(&self) -> AuthState {
        self.snapshot()
    }

    fn snapshot(&self) -> AuthState {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, state: AuthState) {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state.clone();
        self.listeners.notify(&state);
    }
}

impl AuthProvider for LocalAuth {
    fn sign_in_interactive(&self) -> Result<UserIdentity> {
        let identity = self.identity.clone().ok_or(CompanywiseError::NoIdentity)?;
        tracing::info!(uid = %identity.uid, "signed in");
        self.set(Some(identity.clone()));
        Ok(identity)
    }

    fn sign_out(&self) -> Result<()> {
        if self.snapshot().is_some() {
            tracing::info!("signed out");
            self.set(None);
        }
        Ok(())
    }

    fn on_auth_state_changed(&self, callback: AuthCallback) -> Subscription {
        callback(&self.snapshot());
        self.listeners.subscribe(callback)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
