//! Session gate: checks submitted credentials against the credential store.
//!
//! Passwords are never compared directly. Both sides are reduced to SHA-256
//! digests and the fixed-width digests are folded together without early
//! exit, so the time taken does not depend on where the first differing
//! character sits or on the content of either operand.

use crate::secrets::CredentialStore;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::fmt;

/// Username and password as submitted on the login form
struct Credentials {
    username: String,
    password: String,
}

/// Result of the most recent login attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected,
}

/// Per-session state, created when a user opens the tool and dropped (or
/// [`Session::end`]ed) when they leave.
#[derive(Default)]
pub struct Session {
    authenticated: bool,
    last_attempt: Option<LoginOutcome>,
    pending: Option<Credentials>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Outcome of the last attempt, `None` before the first one
    pub fn last_attempt(&self) -> Option<LoginOutcome> {
        self.last_attempt
    }

    /// True when the form should show the "incorrect" message
    pub fn last_attempt_failed(&self) -> bool {
        self.last_attempt == Some(LoginOutcome::Rejected)
    }

    /// Stage credentials from the login form; they stay here only until
    /// the next [`SessionGate::check_pending`].
    pub fn submit(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.pending = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
    }

    pub fn has_pending_credentials(&self) -> bool {
        self.pending.is_some()
    }

    /// Close the session
    pub fn end(self) {
        debug!("session ended (authenticated: {})", self.authenticated);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.authenticated)
            .field("last_attempt", &self.last_attempt)
            .field("pending", &self.pending.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validates login attempts for a session
pub struct SessionGate<'a> {
    store: &'a CredentialStore,
}

impl<'a> SessionGate<'a> {
    pub fn new(store: &'a CredentialStore) -> Self {
        Self { store }
    }

    /// Submit and check a username/password pair in one step
    pub fn authenticate(&self, session: &mut Session, username: &str, password: &str) -> bool {
        session.submit(username, password);
        self.check_pending(session)
    }

    /// Check whatever credentials the session has staged.
    ///
    /// The staged credentials are removed from the session before the
    /// comparison, whatever the outcome. With nothing staged the session's
    /// current state is returned unchanged.
    pub fn check_pending(&self, session: &mut Session) -> bool {
        let Some(credentials) = session.pending.take() else {
            return session.authenticated;
        };

        let accepted = self.verify(&credentials.username, &credentials.password);
        drop(credentials);

        session.authenticated = accepted;
        if accepted {
            session.last_attempt = Some(LoginOutcome::Accepted);
            info!("login accepted");
        } else {
            session.last_attempt = Some(LoginOutcome::Rejected);
            warn!("login rejected: user not known or password incorrect");
        }
        accepted
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        match self.store.password_for(username) {
            Some(stored) => passwords_match(password, stored),
            None => {
                // Same amount of work as a known user, result discarded
                std::hint::black_box(passwords_match(password, ""));
                false
            }
        }
    }
}

/// Compare two secrets in time independent of their content
pub fn passwords_match(submitted: &str, stored: &str) -> bool {
    let a = Sha256::digest(submitted.as_bytes());
    let b = Sha256::digest(stored.as_bytes());
    constant_time_eq(&a, &b)
}

/// Branch-free equality over equal-length byte slices. Slices of different
/// length are unequal; only the length is revealed in that case.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a
        .iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| std::hint::black_box(acc | (x ^ y)));
    diff == 0
}
