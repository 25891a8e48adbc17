// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Submission controller: sends a batch until the API accepts it.
//!
//! | status | action                                              |
//! |--------|-----------------------------------------------------|
//! | 200    | parse the outcome and stop                          |
//! | 401    | renew the token and resend                          |
//! | 429    | sleep `Retry-After + 1` seconds, cumulative, resend |
//! | 400    | fatal                                               |
//! | 403    | fatal                                               |
//! | other  | fatal                                               |
//!
//! The same serialized body is resent on every retry.

use std::sync::Arc;
use std::time::Duration;

use mw_core::api::{Group, GroupPage};
use mw_core::BatchOutcome;

use crate::api::{ApiResponse, BulkApi};
use crate::error::{Error, Result};
use crate::stats::Stats;
use crate::token::TokenProvider;

/// What to do with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    RenewToken,
    Backoff,
    Fatal(&'static str),
}

/// Map an HTTP status to the retry policy.
pub fn classify(status: u16) -> Verdict {
    match status {
        200 => Verdict::Accept,
        400 => Verdict::Fatal("bad request or expired integration certificate"),
        401 => Verdict::RenewToken,
        403 => Verdict::Fatal("missing or invalid API key"),
        429 => Verdict::Backoff,
        _ => Verdict::Fatal("unclassified response"),
    }
}

/// Parse a `Retry-After` value in whole seconds.
pub fn parse_retry_after(value: Option<&str>) -> Result<u64> {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::RetryAfter(value.map(str::to_string)))
}

/// Result of a successful submission.
#[derive(Debug)]
pub struct Submission {
    pub outcome: BatchOutcome,
    /// Round-trips made, including the accepted one.
    pub requests: u32,
    /// Sleeps taken after each 429, in order.
    pub backoffs: Vec<Duration>,
}

/// Retry bookkeeping for one submission.
#[derive(Debug, Default)]
struct Attempts {
    requests: u32,
    retry_amount: u64,
    backoffs: Vec<Duration>,
}

pub struct Submitter {
    api: Arc<dyn BulkApi>,
    tokens: Arc<TokenProvider>,
    stats: Arc<Stats>,
    max_attempts: Option<u32>,
}

impl Submitter {
    pub fn new(
        api: Arc<dyn BulkApi>,
        tokens: Arc<TokenProvider>,
        stats: Arc<Stats>,
        max_attempts: Option<u32>,
    ) -> Self {
        Submitter {
            api,
            tokens,
            stats,
            max_attempts,
        }
    }

    /// Send `body` to the action endpoint until it is accepted.
    pub async fn submit(&self, body: &str) -> Result<Submission> {
        let mut attempts = Attempts::default();
        loop {
            let token = self.tokens.current().await;
            let response = self.api.post_action(body, &token).await.map_err(|e| {
                tracing::error!(error = %e, "failed to send batch");
                e
            })?;
            if self.settle(&mut attempts, "action", &response).await? {
                let outcome = BatchOutcome::from_json(&response.body)?;
                if attempts.requests > 1 {
                    tracing::warn!(
                        requests = attempts.requests,
                        "batch accepted after retries"
                    );
                }
                return Ok(Submission {
                    outcome,
                    requests: attempts.requests,
                    backoffs: attempts.backoffs,
                });
            }
        }
    }

    /// Fetch every page of the group listing.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups = Vec::new();
        let mut page = 0;
        loop {
            let mut attempts = Attempts::default();
            let response = loop {
                let token = self.tokens.current().await;
                let response = self.api.get_groups(page, &token).await?;
                if self.settle(&mut attempts, "groups", &response).await? {
                    break response;
                }
            };
            let listing: GroupPage = serde_json::from_str(&response.body)?;
            groups.extend(listing.groups);
            if listing.last_page {
                return Ok(groups);
            }
            page += 1;
        }
    }

    /// Apply the status policy to one response. Returns `true` once the
    /// response is accepted, `false` when the request should be resent.
    async fn settle(
        &self,
        attempts: &mut Attempts,
        request: &'static str,
        response: &ApiResponse,
    ) -> Result<bool> {
        attempts.requests += 1;
        let status = response.status;
        self.stats.record_response(status);

        match classify(status) {
            Verdict::Accept => Ok(true),
            Verdict::Fatal(reason) => {
                tracing::error!(request, status, reason, body = %response.body, "request rejected");
                Err(Error::Rejected { status, reason })
            }
            Verdict::RenewToken => {
                self.check_ceiling(attempts, request, status)?;
                tracing::warn!(request, status, "access token rejected, renewing");
                self.tokens.renew().await?;
                Ok(false)
            }
            Verdict::Backoff => {
                self.check_ceiling(attempts, request, status)?;
                let retry_after = match parse_retry_after(response.retry_after.as_deref()) {
                    Ok(secs) => secs,
                    Err(e) => {
                        tracing::error!(request, status, error = %e, "cannot back off");
                        return Err(e);
                    }
                };
                attempts.retry_amount += retry_after + 1;
                let wait = Duration::from_secs(attempts.retry_amount);
                tracing::warn!(
                    request,
                    status,
                    retry_after,
                    wait_secs = attempts.retry_amount,
                    "throttled, backing off"
                );
                attempts.backoffs.push(wait);
                tokio::time::sleep(wait).await;
                Ok(false)
            }
        }
    }

    /// Fail once a resendable response arrives at the attempt ceiling.
    fn check_ceiling(&self, attempts: &Attempts, request: &'static str, status: u16) -> Result<()> {
        match self.max_attempts {
            Some(max) if attempts.requests >= max => {
                tracing::error!(request, status, attempts = attempts.requests, "retry limit reached");
                Err(Error::RetryLimit {
                    attempts: attempts.requests,
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
