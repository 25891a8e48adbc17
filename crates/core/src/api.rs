// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the remote user-management bulk API.
//!
//! A batch is a JSON array of [`RequestItem`]s posted to the action
//! endpoint. The response is a [`BatchOutcome`] describing which commands
//! completed, with per-user errors and warnings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Option telling the API not to fail when the account already exists.
pub const IGNORE_IF_EXISTS: &str = "ignoreIfAlreadyExists";

/// One user-addressed command list in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestItem {
    /// Commands applied to the user, in order.
    #[serde(rename = "do")]
    pub actions: Vec<Action>,
    /// Enterprise domain when `user` is a bare identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(
        rename = "useAdobeID",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub use_adobe_id: bool,
    /// The address the API reports back in errors and warnings.
    pub user: String,
}

impl RequestItem {
    /// Grant membership in `group`, creating the federated account first if it
    /// does not exist.
    pub fn add_to_group(person: &FederatedId, group: &str) -> Self {
        RequestItem {
            actions: vec![Action {
                create_federated_id: Some(person.clone()),
                add: Some(GroupList::single(group)),
                ..Action::default()
            }],
            domain: None,
            use_adobe_id: false,
            user: person.email.clone(),
        }
    }

    /// Revoke membership in `group` for `identifier@domain`.
    pub fn remove_from_group(identifier: &str, domain: &str, group: &str) -> Self {
        RequestItem {
            actions: vec![Action {
                remove: Some(GroupList::single(group)),
                ..Action::default()
            }],
            domain: Some(domain.to_string()),
            use_adobe_id: false,
            user: identifier.to_string(),
        }
    }
}

/// A single step; exactly the populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "addAdobeID", default, skip_serializing_if = "Option::is_none")]
    pub add_adobe_id: Option<AdobeId>,
    #[serde(
        rename = "createFederatedID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub create_federated_id: Option<FederatedId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<GroupList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove: Option<GroupList>,
}

/// Group names targeted by an add or remove step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupList {
    pub group: Vec<String>,
}

impl GroupList {
    fn single(group: &str) -> Self {
        GroupList {
            group: vec![group.to_string()],
        }
    }
}

/// Federated account provisioning parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedId {
    pub country: String,
    pub email: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

/// Adobe ID invitation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdobeId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub email: String,
    #[serde(rename = "firstname", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

/// Overall verdict of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeResult {
    /// Every command completed.
    Success,
    /// Some commands failed; see the error list.
    Partial,
    /// The batch was rejected.
    Error,
}

impl OutcomeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeResult::Success => "success",
            OutcomeResult::Partial => "partial",
            OutcomeResult::Error => "error",
        }
    }
}

impl fmt::Display for OutcomeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutcomeResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "success" => Ok(OutcomeResult::Success),
            "partial" => Ok(OutcomeResult::Partial),
            "error" => Ok(OutcomeResult::Error),
            _ => Err(Error::InvalidResult(s.to_string())),
        }
    }
}

/// Response body of the action endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub not_completed: u32,
    #[serde(default)]
    pub completed_in_test_mode: u32,
    /// Raw result string; parse with [`BatchOutcome::result`].
    pub result: String,
    #[serde(default)]
    pub errors: Option<Vec<PerUserError>>,
    #[serde(default)]
    pub warnings: Option<Vec<PerUserWarning>>,
}

impl BatchOutcome {
    /// Parse a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// The typed result, or [`Error::InvalidResult`] if the API broke contract.
    pub fn result(&self) -> Result<OutcomeResult> {
        self.result.parse()
    }

    /// Reported errors, empty when the field was absent or null.
    pub fn errors(&self) -> &[PerUserError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Reported warnings, empty when the field was absent or null.
    pub fn warnings(&self) -> &[PerUserWarning] {
        self.warnings.as_deref().unwrap_or_default()
    }
}

/// A command that failed for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerUserError {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub step: u32,
    #[serde(rename = "requestID", default)]
    pub request_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub error_code: String,
}

/// A command that completed with a caveat for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerUserWarning {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub step: u32,
    #[serde(rename = "requestID", default)]
    pub request_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub warning_code: String,
}

/// One page of the groups listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPage {
    #[serde(default)]
    pub last_page: bool,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A user group or product profile known to the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(rename = "type", default)]
    pub group_type: String,
    pub group_name: String,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_quota: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_profile_name: Option<String>,
}

/// Token issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub access_token: String,
    /// Lifetime in milliseconds.
    #[serde(default)]
    pub expires_in: u64,
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
