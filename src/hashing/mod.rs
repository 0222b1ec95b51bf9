use blake3::Hasher;

/// Computes the 32-byte fingerprint of a cache key's three components.
///
/// Each part is length-prefixed so `("ab", "c")` and `("a", "bc")` never collide.
/// The order of the parts is significant.
#[inline]
pub fn hash_key_parts(schema: &str, query: &str, strategy: &str) -> [u8; 32] {
    let mut hasher = Hasher::new();
    for part in [schema, query, strategy] {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    *hasher.finalize().as_bytes()
}

/// Hex rendering of [`hash_key_parts`].
#[inline]
pub fn fingerprint_hex(schema: &str, query: &str, strategy: &str) -> String {
    blake3::Hash::from(hash_key_parts(schema, query, strategy))
        .to_hex()
        .to_string()
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used where a stable small integer is needed (e.g. vocabulary ids of the
/// stub tokenizer); collisions only degrade scoring, never correctness.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
