// ABOUTME: Validation of token identifiers received from clients
// ABOUTME: Rejects empty, oversized, or non URL-safe ids before they reach a store

use thiserror::Error;

use crate::constants::TOKEN_ID_MAX_LEN;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Token id must not be empty")]
    Empty,
    #[error("Token id exceeds {max} characters")]
    TooLong { max: usize },
    #[error("Token id contains invalid character '{0}'")]
    InvalidCharacter(char),
}

/// Check that `id` is a well-formed token identifier: 1 to 128 characters
/// from `[A-Za-z0-9_-]`.
pub fn validate_token_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Empty);
    }

    if id.len() > TOKEN_ID_MAX_LEN {
        return Err(ValidationError::TooLong {
            max: TOKEN_ID_MAX_LEN,
        });
    }

    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(ValidationError::InvalidCharacter(c));
    }

    Ok(())
}
