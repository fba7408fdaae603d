use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot status message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Per-request session context: who is acting, and which flash messages are
/// waiting for the next rendered page.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<UserId>,
    flashes: Vec<Flash>,
}

impl Session {
    pub fn new(user: Option<UserId>, pending: Vec<Flash>) -> Self {
        Self { user, flashes: pending }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: UserId) -> Self {
        Self { user: Some(user), flashes: Vec::new() }
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.user
    }

    /// Sets the message for `kind`, replacing any pending one of the same kind.
    pub fn set_flash(&mut self, kind: FlashKind, message: impl Into<String>) {
        let message = message.into();
        match self.flashes.iter_mut().find(|f| f.kind == kind) {
            Some(existing) => existing.message = message,
            None => self.flashes.push(Flash { kind, message }),
        }
    }

    pub fn flash(&self, kind: FlashKind) -> Option<&str> {
        self.flashes.iter().find(|f| f.kind == kind).map(|f| f.message.as_str())
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}
