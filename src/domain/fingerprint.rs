use sha2::{Digest, Sha256};

/// Deterministic, order-sensitive fingerprint of a feed's canonical body.
///
/// Only used for equality, so the hex digest of SHA-256 over the trimmed
/// body is plenty.
pub fn fingerprint(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.trim().as_bytes());
    format!("{:x}", hasher.finalize())
}
