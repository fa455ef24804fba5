use sha2::{Digest, Sha256};

/// Bytes of randomness per reset token; hex-encoded this is 40 characters.
pub const TOKEN_BYTES: usize = 20;

pub fn generate() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

pub fn hash(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
