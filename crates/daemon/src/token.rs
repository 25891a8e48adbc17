// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Access token state shared by every outbound request.
//!
//! The token is held behind an `RwLock` and replaced wholesale on renewal.
//! Concurrent renewals may race; callers that read a stale token simply get
//! a 401 and renew again.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use mw_core::api::TokenResponse;
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// A bearer token and when it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token_type: String,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Placeholder used before the first renewal. The API answers it with
    /// 401, which triggers a renewal.
    pub fn empty() -> Self {
        AccessToken {
            token_type: "bearer".to_string(),
            access_token: String::new(),
            expires_at: None,
        }
    }

    /// Convert an issuer response; `expires_in` is in milliseconds.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        let lifetime = chrono::Duration::milliseconds(
            i64::try_from(response.expires_in).unwrap_or(i64::MAX),
        );
        AccessToken {
            token_type: response.token_type,
            access_token: response.access_token,
            expires_at: now.checked_add_signed(lifetime),
        }
    }

    /// Value of the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Exchanges credentials for a fresh access token.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self) -> Pin<Box<dyn Future<Output = Result<TokenResponse>> + Send + '_>>;
}

/// Token issuer speaking the identity service's JWT exchange.
///
/// Posts `client_id`, `client_secret` and `jwt_token` as a form. The JWT is
/// signed elsewhere and read from `assertion_path` on every renewal, so a
/// rotated assertion is picked up without a restart.
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    url: String,
    client_id: String,
    client_secret: String,
    assertion_path: PathBuf,
}

impl HttpTokenIssuer {
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        assertion_path: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpTokenIssuer {
            client,
            url: url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            assertion_path: assertion_path.into(),
        })
    }

    async fn exchange(&self) -> Result<TokenResponse> {
        let assertion = tokio::fs::read_to_string(&self.assertion_path)
            .await
            .map_err(|e| {
                Error::Token(format!(
                    "cannot read assertion {}: {e}",
                    self.assertion_path.display()
                ))
            })?;
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("jwt_token", assertion.trim()),
        ];
        let response = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Token(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Token(format!("HTTP {}: {body}", status.as_u16())));
        }
        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::Token(e.to_string()))
    }
}

impl TokenIssuer for HttpTokenIssuer {
    fn issue(&self) -> Pin<Box<dyn Future<Output = Result<TokenResponse>> + Send + '_>> {
        Box::pin(self.exchange())
    }
}

/// Process-wide holder of the current token.
pub struct TokenProvider {
    issuer: Box<dyn TokenIssuer>,
    token: RwLock<AccessToken>,
    renewals: AtomicU64,
}

impl TokenProvider {
    pub fn new(issuer: Box<dyn TokenIssuer>) -> Self {
        TokenProvider {
            issuer,
            token: RwLock::new(AccessToken::empty()),
            renewals: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current token.
    pub async fn current(&self) -> AccessToken {
        self.token.read().await.clone()
    }

    /// Ask the issuer for a new token and swap it in.
    pub async fn renew(&self) -> Result<()> {
        tracing::info!("renewing access token");
        let response = match self.issuer.issue().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "token renewal failed");
                return Err(e);
            }
        };
        let token = AccessToken::from_response(response, Utc::now());
        if let Some(at) = token.expires_at {
            tracing::debug!(expires_at = %at, "access token renewed");
        }
        *self.token.write().await = token;
        self.renewals.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of successful renewals since startup.
    pub fn renewals(&self) -> u64 {
        self.renewals.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
