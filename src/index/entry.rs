/// A single key/value pair stored in a [`Bucket`](super::bucket::Bucket).
///
/// The key is immutable once an entry is created; `insert` on a duplicate key
/// overwrites the value in place rather than creating a new entry.
#[derive(Debug, Clone)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}
