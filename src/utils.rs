use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::Track;

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque anti-forgery token: 16 random bytes, base64url without padding.
pub fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Formats a duration in milliseconds as `m:ss`.
pub fn format_duration(ms: u64) -> String {
    let total_seconds = (ms + 500) / 1000;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Largest artwork of the track's album, falling back to the second image.
pub fn artwork_url(track: &Track) -> Option<&str> {
    track
        .album
        .images
        .iter()
        .take(2)
        .map(|image| image.url.as_str())
        .find(|url| !url.is_empty())
}
