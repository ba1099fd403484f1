use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// A 256-bit digest.
pub type Digest32 = [u8; 32];

/// The root of an empty Merkle tree and the digest of "nothing".
pub const EMPTY_DIGEST: Digest32 = [0u8; 32];

type HmacSha256 = Hmac<Sha256>;

/// Domain-separated SHA-256. The domain tag is hashed first, terminated by
/// a zero byte that cannot occur inside a tag.
pub fn digest(domain: &str, bytes: &[u8]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([0u8]);
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Domain-separated SHA-256 over several parts. Each part is preceded by
/// its little-endian u64 length so part boundaries are unambiguous.
pub fn digest_parts(domain: &str, parts: &[&[u8]]) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([0u8]);
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Hex rendering of a digest, for logs and error context.
pub fn to_hex(digest: &Digest32) -> String {
    hex::encode(digest)
}

/// HMAC-SHA256 tag over `bytes` under `key`.
pub fn hmac_sha256(key: &[u8], bytes: &[u8]) -> Digest32 {
    let mut mac = HmacSha256::new_from_slice(key)
        .expect("HMAC-SHA256 accepts keys of any length");
    mac.update(bytes);
    mac.finalize().into_bytes().into()
}
