// ABOUTME: Named issuance policies and the registry that resolves them
// ABOUTME: A policy caps how many live tokens one user may hold

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_POLICY;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid policy entry '{0}', expected name:max_tokens")]
    InvalidEntry(String),
    #[error("Invalid max_tokens for policy '{name}': {value}")]
    InvalidLimit { name: String, value: String },
    #[error("Duplicate policy: {0}")]
    Duplicate(String),
    #[error("Policy registry is empty")]
    Empty,
}

/// An issuance policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub name: String,
    pub max_tokens: u32,
}

impl Policy {
    pub fn new(name: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            name: name.into(),
            max_tokens,
        }
    }
}

/// Set of known policies keyed by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRegistry {
    policies: BTreeMap<String, Policy>,
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        let mut policies = BTreeMap::new();
        policies.insert(DEFAULT_POLICY.to_string(), Policy::new(DEFAULT_POLICY, 3));
        Self { policies }
    }
}

impl PolicyRegistry {
    pub fn new(policies: impl IntoIterator<Item = Policy>) -> Result<Self, PolicyError> {
        let mut map = BTreeMap::new();
        for policy in policies {
            if map.contains_key(&policy.name) {
                return Err(PolicyError::Duplicate(policy.name));
            }
            map.insert(policy.name.clone(), policy);
        }

        if map.is_empty() {
            return Err(PolicyError::Empty);
        }

        Ok(Self { policies: map })
    }

    pub fn get(&self, name: &str) -> Option<&Policy> {
        self.policies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }
}

/// Parses `free:3,pro:20`
impl FromStr for PolicyRegistry {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let policies = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, max) = entry
                    .split_once(':')
                    .ok_or_else(|| PolicyError::InvalidEntry(entry.to_string()))?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(PolicyError::InvalidEntry(entry.to_string()));
                }
                let max_tokens = max.trim().parse::<u32>().map_err(|_| PolicyError::InvalidLimit {
                    name: name.to_string(),
                    value: max.trim().to_string(),
                })?;
                Ok(Policy::new(name, max_tokens))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(policies)
    }
}
