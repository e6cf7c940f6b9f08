///Default fast, non-cryptographic hasher used by the index when the caller doesn't supply one.
pub type FastHasher = twox_hash::XxHash;
