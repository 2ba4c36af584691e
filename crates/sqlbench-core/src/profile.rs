//! Credential store boundary
//!
//! Connection credentials live in an external config collaborator; this
//! module only defines the lookup interface and the fallback contract.

use crate::EngineKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Login credentials for one engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    /// Create credentials from user and password
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }

    /// The placeholder returned when no configuration is available
    pub fn none() -> Self {
        Self::new("none", "none")
    }
}

/// Supplies connection credentials per engine type
///
/// Implementations must not fail: a missing or unreadable configuration
/// yields the `"none"/"none"` placeholder instead of an error.
pub trait CredentialStore: Send + Sync {
    /// Look up credentials for an engine, falling back to
    /// [`Credentials::none`] when none are configured.
    fn credentials(&self, engine: EngineKind) -> Credentials;
}

/// In-memory credential store for tests and embedders without a config file
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    creds: RwLock<HashMap<EngineKind, Credentials>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set credentials for an engine
    pub fn set(&self, engine: EngineKind, credentials: Credentials) {
        self.creds.write().insert(engine, credentials);
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn credentials(&self, engine: EngineKind) -> Credentials {
        match self.creds.read().get(&engine) {
            Some(c) => c.clone(),
            None => {
                tracing::warn!(engine = %engine, "no stored credentials, using placeholder");
                Credentials::none()
            }
        }
    }
}
