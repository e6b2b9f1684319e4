//! Broadcast holder for [`AuthState`]

use std::sync::Arc;

use campus_domain::{AuthState, UserSummary};
use tokio::sync::watch;

/// Single-writer, many-reader authentication state.
///
/// Readers either poll [`current`](Self::current) or await changes on a
/// receiver from [`subscribe`](Self::subscribe). Only the coordinator writes.
#[derive(Debug, Clone)]
pub struct AuthStateStore {
    sender: Arc<watch::Sender<AuthState>>,
}

impl AuthStateStore {
    pub fn new(initial: AuthState) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self { sender: Arc::new(sender) }
    }

    /// Get the current auth state
    pub fn current(&self) -> AuthState {
        self.sender.borrow().clone()
    }

    /// Check if authenticated without cloning
    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_authenticated()
    }

    /// Subscribe to auth state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.sender.subscribe()
    }

    /// Replace the state; subscribers are only woken when it changed.
    pub fn set(&self, state: AuthState) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        })
    }

    /// Transition to authenticated with a validated user.
    pub fn authenticate(&self, user: UserSummary) -> bool {
        self.set(AuthState::Authenticated { user: Some(user) })
    }

    /// Mark the session authenticated, keeping any user already known.
    pub fn keep_authenticated(&self) -> bool {
        self.sender.send_if_modified(|current| {
            if current.is_authenticated() {
                return false;
            }
            *current = AuthState::Authenticated { user: None };
            true
        })
    }

    pub fn sign_out(&self) -> bool {
        self.set(AuthState::Unauthenticated)
    }
}

impl Default for AuthStateStore {
    fn default() -> Self {
        Self::new(AuthState::Unauthenticated)
    }
}
