//! Injected session context: the credential and the page visibility signal.
//!
//! Both are explicit handles owned by the host session and passed into the channel builder,
//! so several channels (or none) can share them without global state.

use std::sync::Arc;
use tokio::sync::watch;

/// Credential holder for the current user session.
#[derive(Debug, Clone)]
pub struct Session {
    token: Arc<watch::Sender<Option<String>>>,
}

impl Session {
    /// Creates a session without a credential
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { token: Arc::new(tx) }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set_token(token);
        session
    }

    /// Stores a new credential. An empty token counts as no credential.
    ///
    /// Watchers are only notified when the credential actually changes.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.replace(if token.is_empty() { None } else { Some(token) });
    }

    /// Removes the credential (logout, expiry)
    pub fn revoke(&self) {
        self.replace(None);
    }

    fn replace(&self, token: Option<String>) {
        self.token.send_if_modified(|current| {
            if *current == token {
                return false;
            }
            *current = token;
            true
        });
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Watches credential changes
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the page (or window) showing the console is currently visible.
#[derive(Debug, Clone)]
pub struct PageVisibility {
    visible: Arc<watch::Sender<bool>>,
}

impl PageVisibility {
    /// Creates a signal that starts visible
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self {
            visible: Arc::new(tx),
        }
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.send_if_modified(|current| {
            let changed = *current != visible;
            *current = visible;
            changed
        });
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }
}

impl Default for PageVisibility {
    fn default() -> Self {
        Self::new()
    }
}
