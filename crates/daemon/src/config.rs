// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration, loaded from a TOML file.
//!
//! ```toml
//! group = "Engineering"
//! country = "US"
//!
//! [server]
//! host = "usermanagement.adobe.io"
//! endpoint = "/v2/usermanagement"
//! ims_host = "ims-na1.adobelogin.com"
//! ims_endpoint = "/ims/exchange/jwt"
//!
//! [enterprise]
//! domain = "example.edu"
//! org_id = "ORG@AdobeOrg"
//! api_key = "..."
//! client_secret = "..."
//! assertion_path = "/etc/mudwork/assertion.jwt"
//!
//! [ldap]
//! url = "ldap://ldap.example.edu"
//! base = "ou=people,dc=example,dc=edu"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/mudwork.toml";

/// Database filename used when `db_path` is not configured.
pub const DEFAULT_DB_NAME: &str = "mudwork.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding the queue and managed users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// Group every managed user is added to or removed from.
    pub group: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Country code for newly created federated accounts.
    #[serde(default = "default_country")]
    pub country: String,
    /// Send batches with `testOnly=true` and skip local mutations.
    #[serde(default)]
    pub test_mode: bool,
    pub server: ServerConfig,
    pub enterprise: EnterpriseConfig,
    pub ldap: LdapConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Remote endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub endpoint: String,
    pub ims_host: String,
    pub ims_endpoint: String,
}

/// Enterprise credentials and identity domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseConfig {
    pub domain: String,
    pub org_id: String,
    pub api_key: String,
    pub client_secret: String,
    /// File holding the pre-signed JWT exchanged for access tokens.
    pub assertion_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdapConfig {
    pub url: String,
    pub base: String,
    #[serde(default = "default_first_name_attr")]
    pub first_name_attr: String,
    #[serde(default = "default_last_name_attr")]
    pub last_name_attr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,
}

/// Submission retry policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Requests allowed per submission before giving up. Unbounded if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_page_size() -> usize {
    mw_core::DEFAULT_PAGE_SIZE
}

fn default_country() -> String {
    "US".to_string()
}

fn default_first_name_attr() -> String {
    "givenName".to_string()
}

fn default_last_name_attr() -> String {
    "sn".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.group.trim().is_empty() {
            return Err(Error::Config("group must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }
        if self.enterprise.domain.trim().is_empty() {
            return Err(Error::Config(
                "enterprise.domain must not be empty".to_string(),
            ));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(Error::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Database path, defaulting to a file in `state_dir`.
    pub fn db_path(&self, state_dir: &Path) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| state_dir.join(DEFAULT_DB_NAME))
    }

    /// Base URL of the bulk API, without the trailing `/action/...`.
    pub fn api_base_url(&self) -> String {
        format!("https://{}{}", self.server.host, self.server.endpoint)
    }

    /// Token exchange URL.
    pub fn token_url(&self) -> String {
        format!("https://{}{}", self.server.ims_host, self.server.ims_endpoint)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.retry.request_timeout_secs)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
