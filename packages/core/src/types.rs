// ABOUTME: Type definitions for issued tokens
// ABOUTME: Token records and the per-request identity supplied by an auth provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An issued token. The `token` string is both the credential and the
/// store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token: String,
    pub user_id: String,
    pub policy_name: String,
    pub created_at: DateTime<Utc>,
}

impl Token {
    pub fn new(token: String, user_id: String, policy_name: String) -> Self {
        Self {
            token,
            user_id,
            policy_name,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Identity and policy resolved for a single request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderContext {
    pub user_id: String,
    pub policy_name: String,
}

impl ProviderContext {
    pub fn new(user_id: impl Into<String>, policy_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            policy_name: policy_name.into(),
        }
    }
}
