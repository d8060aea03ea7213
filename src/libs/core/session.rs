use crate::libs::core::models::{AuthStateChange, SessionState};
use tracing::info;

/// Side effects the owner of the session has to carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    /// Entered or refreshed `SignedIn`. The feed listener should be attached.
    SignedIn { username: String },
    /// Entered `SignedOut`. Clear the feed, detach the listener and prompt for sign-in.
    SignedOut,
}

/// Two-state machine driven only by identity-provider notifications.
#[derive(Debug)]
pub struct SessionController {
    state: SessionState,
    anonymous_name: String,
}

impl SessionController {
    pub fn new(anonymous_name: impl Into<String>) -> Self {
        Self {
            state: SessionState::SignedOut,
            anonymous_name: anonymous_name.into(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.state, SessionState::SignedIn { .. })
    }

    /// The name attached to outgoing messages. The sentinel while signed out.
    pub fn username(&self) -> &str {
        match &self.state {
            SessionState::SignedIn { display_name } => display_name,
            SessionState::SignedOut => &self.anonymous_name,
        }
    }

    pub fn apply(&mut self, change: AuthStateChange) -> SessionTransition {
        match change {
            AuthStateChange::SignedIn { display_name } => {
                let username = display_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| self.anonymous_name.clone());
                info!(%username, "signed in");
                self.state = SessionState::SignedIn {
                    display_name: username.clone(),
                };
                SessionTransition::SignedIn { username }
            }
            AuthStateChange::SignedOut => {
                info!("signed out");
                self.state = SessionState::SignedOut;
                SessionTransition::SignedOut
            }
        }
    }
}
