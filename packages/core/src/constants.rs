use std::env;
use std::path::PathBuf;

/// Longest token identifier accepted on any surface
pub const TOKEN_ID_MAX_LEN: usize = 128;

/// User assumed by single-tenant deployments
pub const DEFAULT_USER: &str = "default-user";

/// Policy assigned when the provider does not name one
pub const DEFAULT_POLICY: &str = "free";

/// Get the path to the Tessera directory (~/.tessera)
pub fn tessera_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".tessera")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tessera")
    }
}

/// Get the default SQLite database path (~/.tessera/tessera.db)
pub fn database_file() -> PathBuf {
    tessera_dir().join("tessera.db")
}
