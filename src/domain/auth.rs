//! Session handles returned by login flows.
//!
//! Tokens are never kept in ambient global state: whoever logs in owns the
//! session value and passes it to each call that needs it. Logging out
//! consumes the value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer token for the admin API.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: String,
}

impl AdminSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Ends the session.
    pub fn logout(self) {
        tracing::info!("admin session closed");
    }
}

impl fmt::Debug for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSession")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Session issued to a bulk buyer after code verification.
#[derive(Clone, PartialEq, Eq)]
pub struct CustomerSession {
    contact: String,
    token: String,
}

impl CustomerSession {
    pub fn new(contact: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            contact: contact.into(),
            token: token.into(),
        }
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for CustomerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerSession")
            .field("contact", &self.contact)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// One page of the admin PIN inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinPage {
    pub page: u32,
    pub pins: Vec<serde_json::Value>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub message: String,
}
