// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Directory attribute lookup for users being added.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use ldap3::{LdapConnAsync, LdapConnSettings, Scope, SearchEntry};

use crate::config::LdapConfig;
use crate::error::Result;

/// Attributes needed to provision a federated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Resolves an identifier to a [`Person`].
///
/// `Ok(None)` means the directory has no usable entry (including one with an
/// empty first name). `Err` means the directory could not be asked and the
/// lookup may succeed later.
pub trait AttributeLookup: Send + Sync {
    fn resolve<'a>(
        &'a self,
        identifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Person>>> + Send + 'a>>;
}

/// LDAP-backed lookup. Opens one connection per resolve.
pub struct LdapLookup {
    config: LdapConfig,
    domain: String,
    timeout: Duration,
}

impl LdapLookup {
    pub fn new(config: LdapConfig, domain: impl Into<String>, timeout: Duration) -> Self {
        LdapLookup {
            config,
            domain: domain.into(),
            timeout,
        }
    }

    async fn search(&self, identifier: &str) -> Result<Option<Person>> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.url).await?;
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection driver error");
            }
        });

        if let Some(bind_dn) = &self.config.bind_dn {
            let password = self.config.bind_password.as_deref().unwrap_or("");
            ldap.simple_bind(bind_dn, password).await?.success()?;
        }

        let filter = uid_filter(identifier);
        let attrs = vec![
            self.config.first_name_attr.as_str(),
            self.config.last_name_attr.as_str(),
        ];
        let (entries, _) = ldap
            .search(&self.config.base, Scope::Subtree, &filter, attrs)
            .await?
            .success()?;

        let person = entries.into_iter().next().and_then(|e| {
            let entry = SearchEntry::construct(e);
            person_from_attrs(
                &entry.attrs,
                &self.config.first_name_attr,
                &self.config.last_name_attr,
                email_for(identifier, &self.domain),
            )
        });

        if let Err(e) = ldap.unbind().await {
            tracing::debug!(error = %e, "LDAP unbind failed");
        }
        Ok(person)
    }
}

impl AttributeLookup for LdapLookup {
    fn resolve<'a>(
        &'a self,
        identifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Person>>> + Send + 'a>> {
        Box::pin(self.search(identifier))
    }
}

/// Search filter matching `identifier` exactly.
pub fn uid_filter(identifier: &str) -> String {
    format!("(uid={})", escape_filter_value(identifier))
}

/// Escape special characters in LDAP filter values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    value
        .replace('\\', "\\5c")
        .replace('*', "\\2a")
        .replace('(', "\\28")
        .replace(')', "\\29")
        .replace('\0', "\\00")
}

pub fn email_for(identifier: &str, domain: &str) -> String {
    format!("{identifier}@{domain}")
}

/// Build a [`Person`] from search attributes. A missing or empty first
/// name yields `None`.
pub fn person_from_attrs(
    attrs: &HashMap<String, Vec<String>>,
    first_name_attr: &str,
    last_name_attr: &str,
    email: String,
) -> Option<Person> {
    let first = |name: &str| attrs.get(name).and_then(|v| v.first()).cloned();
    let first_name = first(first_name_attr).filter(|n| !n.is_empty())?;
    Some(Person {
        first_name,
        last_name: first(last_name_attr).unwrap_or_default(),
        email,
    })
}

#[cfg(test)]
#[path = "lookup_tests.rs"]
mod tests;
