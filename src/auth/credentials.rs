//! Storage account credential resolution
//!
//! Shared-key credentials for the two logical storage accounts are read from
//! environment variables whose names carry an account-specific prefix.

use crate::error::{Result, StageError};
use azure_storage::StorageCredentials;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use zeroize::Zeroizing;

/// Base name of the variable holding the storage account name
pub const ACCOUNT_NAME_ENV_VAR: &str = "AZURE_STORAGE_ACCOUNT_NAME";

/// Base name of the variable holding the storage account key
pub const ACCOUNT_KEY_ENV_VAR: &str = "AZURE_STORAGE_ACCOUNT_KEY";

/// Logical storage account selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Account holding the upload (B) and results containers
    #[default]
    Default,
    /// Account holding the server-side copy destination (C)
    Secondary,
}

impl AccountKind {
    /// Prefix prepended to the base environment variable names
    pub fn env_prefix(&self) -> &'static str {
        match self {
            AccountKind::Default => "",
            AccountKind::Secondary => "SECONDARY_",
        }
    }

    pub fn name_var(&self) -> String {
        format!("{}{}", self.env_prefix(), ACCOUNT_NAME_ENV_VAR)
    }

    pub fn key_var(&self) -> String {
        format!("{}{}", self.env_prefix(), ACCOUNT_KEY_ENV_VAR)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Default => write!(f, "default"),
            AccountKind::Secondary => write!(f, "secondary"),
        }
    }
}

impl std::str::FromStr for AccountKind {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "" => Ok(AccountKind::Default),
            "secondary" => Ok(AccountKind::Secondary),
            other => Err(StageError::config(format!(
                "Unknown storage account '{other}', expected 'default' or 'secondary'"
            ))),
        }
    }
}

/// Source of environment values
///
/// The process environment in production, a plain map in tests.
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Shared-key credentials for one storage account
#[derive(Clone)]
pub struct StorageAccountCredentials {
    kind: AccountKind,
    name: String,
    key: Zeroizing<String>,
}

impl StorageAccountCredentials {
    pub fn new<N: Into<String>, K: Into<String>>(kind: AccountKind, name: N, key: K) -> Self {
        Self {
            kind,
            name: name.into(),
            key: Zeroizing::new(key.into()),
        }
    }

    /// Resolve the credentials for `kind` from `env`.
    ///
    /// Unset and empty variables are both reported, all of them at once.
    pub fn resolve(kind: AccountKind, env: &dyn EnvSource) -> Result<Self> {
        let name_var = kind.name_var();
        let key_var = kind.key_var();

        let name = env.var(&name_var).filter(|v| !v.is_empty());
        let key = env.var(&key_var).filter(|v| !v.is_empty());

        match (name, key) {
            (Some(name), Some(key)) => Ok(Self::new(kind, name, key)),
            (name, key) => {
                let mut missing = Vec::new();
                if name.is_none() {
                    missing.push(name_var);
                }
                if key.is_none() {
                    missing.push(key_var);
                }
                Err(StageError::missing_credentials(missing))
            }
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Storage account name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base64 account key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Azure SDK shared-key credentials
    pub fn storage_credentials(&self) -> StorageCredentials {
        StorageCredentials::access_key(self.name.clone(), self.key.to_string())
    }

    /// Blob service endpoint of this account
    pub fn service_url(&self) -> String {
        format!("https://{}.blob.core.windows.net/", self.name)
    }
}

impl fmt::Debug for StorageAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageAccountCredentials")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .finish()
    }
}
