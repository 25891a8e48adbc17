// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the remote user-management bulk API.
//!
//! The [`BulkApi`] trait returns the raw status, `Retry-After` header and
//! body; the status policy lives in [`crate::submit`] so it can be tested
//! against a scripted mock.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};

use crate::error::Result;
use crate::token::AccessToken;

/// What came back from one HTTP round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub retry_after: Option<String>,
    pub body: String,
}

/// Transport to the bulk API.
pub trait BulkApi: Send + Sync {
    /// Post a serialized batch to the action endpoint.
    fn post_action<'a>(
        &'a self,
        body: &'a str,
        token: &'a AccessToken,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>>;

    /// Fetch one page of the group listing.
    fn get_groups<'a>(
        &'a self,
        page: u32,
        token: &'a AccessToken,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>>;
}

/// HTTP implementation using reqwest.
pub struct HttpBulkApi {
    client: reqwest::Client,
    base_url: String,
    org_id: String,
    api_key: String,
    test_mode: bool,
}

impl HttpBulkApi {
    /// `base_url` is `https://{host}{endpoint}`. Every request is bounded
    /// by `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        org_id: impl Into<String>,
        api_key: impl Into<String>,
        test_mode: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpBulkApi {
            client,
            base_url: base_url.into(),
            org_id: org_id.into(),
            api_key: api_key.into(),
            test_mode,
        })
    }

    pub fn action_url(&self) -> String {
        let url = format!("{}/action/{}", self.base_url, self.org_id);
        if self.test_mode {
            format!("{url}?testOnly=true")
        } else {
            url
        }
    }

    pub fn groups_url(&self, page: u32) -> String {
        format!("{}/groups/{}/{page}", self.base_url, self.org_id)
    }

    async fn send(&self, request: reqwest::RequestBuilder, token: &AccessToken) -> Result<ApiResponse> {
        let response = request
            .header(ACCEPT, "application/json")
            .header("x-api-key", &self.api_key)
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;
        Ok(ApiResponse {
            status,
            retry_after,
            body,
        })
    }
}

impl BulkApi for HttpBulkApi {
    fn post_action<'a>(
        &'a self,
        body: &'a str,
        token: &'a AccessToken,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.action_url())
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
            self.send(request, token).await
        })
    }

    fn get_groups<'a>(
        &'a self,
        page: u32,
        token: &'a AccessToken,
    ) -> Pin<Box<dyn Future<Output = Result<ApiResponse>> + Send + 'a>> {
        Box::pin(async move {
            let request = self
                .client
                .get(self.groups_url(page))
                .header(CONTENT_TYPE, "application/json");
            self.send(request, token).await
        })
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
