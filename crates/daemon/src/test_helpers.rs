// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory collaborators for daemon tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mw_core::api::TokenResponse;
use mw_core::Database;

use crate::api::{ApiResponse, BulkApi};
use crate::error::{Error, Result};
use crate::lookup::{AttributeLookup, Person};
use crate::token::{AccessToken, TokenIssuer};
use crate::SharedDb;

pub const DOMAIN: &str = "example.edu";
pub const GROUP: &str = "Engineering";

/// Fresh in-memory store behind the shared mutex.
pub fn shared_db() -> SharedDb {
    Arc::new(tokio::sync::Mutex::new(Database::open_in_memory().unwrap()))
}

pub fn ok(body: &str) -> ApiResponse {
    ApiResponse {
        status: 200,
        retry_after: None,
        body: body.to_string(),
    }
}

pub fn status(code: u16) -> ApiResponse {
    ApiResponse {
        status: code,
        retry_after: None,
        body: String::new(),
    }
}

pub fn throttled(retry_after: &str) -> ApiResponse {
    ApiResponse {
        status: 429,
        retry_after: Some(retry_after.to_string()),
        body: String::new(),
    }
}

pub const SUCCESS: &str = r#"{"completed":1,"notCompleted":0,"completedInTestMode":0,"result":"success"}"#;

/// A request the mock API received.
#[derive(Debug, Clone)]
pub struct Sent {
    pub body: String,
    pub token: String,
}

/// Bulk API that replays scripted responses, then answers `fallback`.
pub struct MockApi {
    script: Mutex<VecDeque<ApiResponse>>,
    fallback: ApiResponse,
    sent: Mutex<Vec<Sent>>,
    pages: Mutex<VecDeque<ApiResponse>>,
}

impl MockApi {
    pub fn new(script: Vec<ApiResponse>) -> Arc<Self> {
        Arc::new(MockApi {
            script: Mutex::new(script.into()),
            fallback: ok(SUCCESS),
            sent: Mutex::new(Vec::new()),
            pages: Mutex::new(VecDeque::new()),
        })
    }

    pub fn with_pages(pages: Vec<ApiResponse>) -> Arc<Self> {
        Arc::new(MockApi {
            script: Mutex::new(VecDeque::new()),
            fallback: ok(SUCCESS),
            sent: Mutex::new(Vec::new()),
            pages: Mutex::new(pages.into()),
        })
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

impl BulkApi for MockApi {
    fn post_action<'a>(
        &'a self,
        body: &'a str,
        token: &'a AccessToken,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(Sent {
                body: body.to_string(),
                token: token.access_token.clone(),
            });
            let next = self.script.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| self.fallback.clone()))
        })
    }

    fn get_groups<'a>(
        &'a self,
        _page: u32,
        _token: &'a AccessToken,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>> {
        Box::pin(async move {
            let next = self.pages.lock().unwrap().pop_front();
            Ok(next.unwrap_or_else(|| ok(r#"{"lastPage":true,"result":"success","groups":[]}"#)))
        })
    }
}

/// Issuer handing out `token-1`, `token-2`, ... or failing on demand.
#[derive(Default)]
pub struct MockIssuer {
    pub issued: Arc<AtomicUsize>,
    pub fail: bool,
}

impl MockIssuer {
    pub fn failing() -> Self {
        MockIssuer {
            fail: true,
            ..MockIssuer::default()
        }
    }
}

impl TokenIssuer for MockIssuer {
    fn issue(&self) -> Pin<Box<dyn Future<Output = Result<TokenResponse>> + Send + '_>> {
        Box::pin(async move {
            if self.fail {
                return Err(Error::Token("HTTP 400: invalid_client".to_string()));
            }
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenResponse {
                token_type: "bearer".to_string(),
                access_token: format!("token-{n}"),
                expires_in: 86_400_000,
            })
        })
    }
}

/// Directory with a fixed set of people. Identifiers listed in `flaky`
/// fail that many times before resolving.
#[derive(Default)]
pub struct MockLookup {
    people: HashMap<String, Person>,
    flaky: Mutex<HashMap<String, usize>>,
    pub calls: AtomicUsize,
}

impl MockLookup {
    pub fn with(ids: &[&str]) -> Self {
        let people = ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    Person {
                        first_name: format!("First-{id}"),
                        last_name: format!("Last-{id}"),
                        email: format!("{id}@{DOMAIN}"),
                    },
                )
            })
            .collect();
        MockLookup {
            people,
            ..MockLookup::default()
        }
    }

    /// Make `id` fail `times` times before answering.
    pub fn flaky(self, id: &str, times: usize) -> Self {
        self.flaky.lock().unwrap().insert(id.to_string(), times);
        self
    }

    /// Register a directory entry with no first name.
    pub fn nameless(mut self, id: &str) -> Self {
        self.people.insert(
            id.to_string(),
            Person {
                first_name: String::new(),
                last_name: "Nobody".to_string(),
                email: format!("{id}@{DOMAIN}"),
            },
        );
        self
    }
}

impl AttributeLookup for MockLookup {
    fn resolve<'a>(
        &'a self,
        identifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Person>>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            {
                let mut flaky = self.flaky.lock().unwrap();
                if let Some(left) = flaky.get_mut(identifier) {
                    if *left > 0 {
                        *left -= 1;
                        return Err(Error::Lookup("connection refused".to_string()));
                    }
                }
            }
            Ok(self
                .people
                .get(identifier)
                .filter(|p| !p.first_name.is_empty())
                .cloned())
        })
    }
}
