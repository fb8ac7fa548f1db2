use sha2::{Digest, Sha256};

/// Hex SHA-256 of the document text, used to detect duplicate cases.
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
