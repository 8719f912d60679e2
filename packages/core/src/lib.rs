// ABOUTME: Core types, policies, and validation for Tessera
// ABOUTME: Foundational package shared by the storage, api, and cli packages

pub mod constants;
pub mod policy;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{ProviderContext, Token};

// Re-export policy registry
pub use policy::{Policy, PolicyError, PolicyRegistry};

// Re-export constants
pub use constants::{database_file, tessera_dir, DEFAULT_POLICY, DEFAULT_USER, TOKEN_ID_MAX_LEN};

// Re-export utilities
pub use utils::generate_token;

// Re-export validation
pub use validation::{validate_token_id, ValidationError};
