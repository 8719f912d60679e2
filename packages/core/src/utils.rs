// ABOUTME: Shared utility functions for Tessera
// ABOUTME: Token string generation

use base64::Engine;
use rand::Rng;

/// Generate a cryptographically secure random token.
/// 32 random bytes, URL-safe base64 without padding (43 chars).
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 32] = rng.gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}
