//! Extendible hashing: a dynamic-directory hash index.
//!
//! The directory maps the low `global_depth` bits of a key's hash to a
//! bucket. A bucket that overflows splits into two siblings of local depth
//! one greater than the parent's, doubling the directory first if the
//! parent's local depth had already caught up to the global depth.
//!
//! This is the indexing primitive a buffer-pool manager uses to translate
//! page identifiers to in-memory frames (see [`crate::buffer_pool`]) — the
//! same role `ExtendibleHash<K, V>` plays in the CMU `cmudb` reference this
//! implementation traces to.

mod bucket;
mod entry;

pub use bucket::Put;
pub use entry::Entry;

use crate::config::IndexConfig;
use bucket::Bucket;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// An in-memory associative container implemented via extendible hashing.
///
/// `K` must be `Hash + Eq + Clone`; `V` must be `Clone` (both lookup and
/// overwrite-on-duplicate return/replace by value). `H` is the hasher used to
/// turn a key into a directory index — it defaults to
/// [`crate::util::hash::FastHasher`] but any `Hasher + Default` works,
/// including `std::collections::hash_map::DefaultHasher`.
pub struct ExtendibleHashIndex<K, V, H = crate::util::hash::FastHasher> {
    /// `directory[i]` is an index into `buckets`. Multiple directory slots
    /// may point at the same bucket index when that bucket's local depth is
    /// below `global_depth`.
    directory: Vec<usize>,
    buckets: Vec<Bucket<K, V>>,
    global_depth: usize,
    bucket_capacity: usize,
    max_global_depth: usize,
    _hasher: PhantomData<H>,
}

impl<K, V, H> ExtendibleHashIndex<K, V, H>
where
    K: Hash + Eq + Clone,
    V: Clone,
    H: Hasher + Default,
{
    /// Builds an index with the given per-bucket capacity and default tuning
    /// (see [`IndexConfig`]). Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(IndexConfig::new(capacity))
    }

    pub fn with_config(config: IndexConfig) -> Self {
        let global_depth = IndexConfig::INITIAL_GLOBAL_DEPTH;
        let directory_size = 1usize << global_depth;
        let bucket_capacity = config.bucket_capacity();

        // One distinct bucket per initial directory slot, each at local depth
        // global_depth — not one bucket shared by all four slots. A shared
        // initial bucket would violate invariant 3 in §8 (a bucket's
        // referencing slots must share its low `local_depth` bits) the moment
        // a second key landed in a different slot, and the worked example in
        // §8 scenario (b) only reproduces with distinct per-slot buckets; see
        // the design notes for the full resolution of this source ambiguity.
        let buckets = (0..directory_size)
            .map(|_| Bucket::new(bucket_capacity, global_depth))
            .collect();
        let directory = (0..directory_size).collect();

        Self {
            directory,
            buckets,
            global_depth,
            bucket_capacity,
            max_global_depth: config.max_global_depth(),
            _hasher: PhantomData,
        }
    }

    /// Looks up `key`, returning a clone of its value if present.
    pub fn find(&self, key: &K) -> Option<V> {
        let bucket_id = self.bucket_id_for(key);
        self.buckets[bucket_id].find(key).cloned()
    }

    /// Inserts `key -> value`, overwriting any existing value for `key`.
    ///
    /// Expressed as an explicit loop rather than the recursive retry the
    /// reference implementation uses: on overflow, the full bucket splits (or
    /// the directory doubles first if needed) and the same key/value is
    /// retried against the reshaped index. The loop terminates once a split
    /// separates the colliding keys, bounded by `max_global_depth`.
    pub fn insert(&mut self, key: K, value: V) {
        loop {
            let dir_index = self.directory_index_for(&key);
            let bucket_id = self.directory[dir_index];

            match self.buckets[bucket_id].put(key.clone(), value.clone()) {
                Put::Overwrote | Put::Inserted => return,
                Put::Full => self.split(bucket_id),
            }
        }
    }

    /// Removes `key` if present, returning whether it was found. Never
    /// merges buckets or shrinks the directory (see Non-goals).
    pub fn remove(&mut self, key: &K) -> bool {
        let bucket_id = self.bucket_id_for(key);
        self.buckets[bucket_id].remove(key)
    }

    pub fn global_depth(&self) -> usize {
        self.global_depth
    }

    /// Local depth of the bucket referenced by directory slot `slot_index`.
    /// Panics if `slot_index` is out of range — an out-of-range index is a
    /// caller bug, not a recoverable condition.
    pub fn local_depth(&self, slot_index: usize) -> usize {
        let bucket_id = *self
            .directory
            .get(slot_index)
            .unwrap_or_else(|| panic!("directory slot {slot_index} out of range (0..{})", self.directory.len()));
        self.buckets[bucket_id].local_depth()
    }

    /// Number of directory slots, i.e. `2^global_depth`. This mirrors the
    /// reference `GetNumBuckets`, which returns the directory size rather
    /// than the count of *distinct* buckets — a misleading name this
    /// implementation preserves for behavioral fidelity (see design notes).
    pub fn num_buckets(&self) -> usize {
        self.directory.len()
    }

    /// Count of distinct buckets actually backing the directory (as opposed
    /// to [`Self::num_buckets`], which counts directory slots). Useful for
    /// introspection/tests without relying on the source's naming quirk.
    pub fn distinct_bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn directory_index_for(&self, key: &K) -> usize {
        let mut hasher = H::default();
        key.hash(&mut hasher);
        let hash = hasher.finish() as usize;
        hash & ((1usize << self.global_depth) - 1)
    }

    fn bucket_id_for(&self, key: &K) -> usize {
        self.directory[self.directory_index_for(key)]
    }

    /// Splits the full bucket at `bucket_id`, doubling the directory first if
    /// its local depth has already caught up to the global depth. §4.3 of the
    /// design doc.
    fn split(&mut self, bucket_id: usize) {
        let local_depth = self.buckets[bucket_id].local_depth();
        if local_depth == self.global_depth {
            self.double_directory();
        }

        let new_depth = local_depth + 1;
        // Every slot currently pointing at `bucket_id` shares its low
        // `local_depth` bits (invariant 3, §8); the one new bit that
        // distinguishes them after this split is bit `local_depth` itself.
        // Comparing the full low-`new_depth` bit pattern against `dir_index`'s
        // (rather than this single bit) looks equivalent but isn't: once the
        // directory has just doubled, every slot below `new_depth` bits wide
        // trivially matches its own pattern, which collapses the match to
        // "j == dir_index" alone and retargets a single slot instead of the
        // whole sibling half. The reference C++ uses the single-bit test
        // (`i != (i & mask)`, equivalent to "bit local_depth of i is set");
        // this mirrors it.
        let partner_bit = 1usize << local_depth;

        let sibling_id = self.buckets.len();
        self.buckets.push(Bucket::new(self.bucket_capacity, new_depth));

        for j in 0..self.directory.len() {
            if self.directory[j] == bucket_id && (j & partner_bit) != 0 {
                self.directory[j] = sibling_id;
            }
        }

        self.buckets[bucket_id].set_local_depth(new_depth);

        log::debug!(
            "split bucket {bucket_id} (local_depth {local_depth} -> {new_depth}), new sibling {sibling_id}, global_depth now {}",
            self.global_depth
        );

        let displaced = self.buckets[bucket_id].drain_entries();
        for entry in displaced {
            let destination = self.bucket_id_for(&entry.key);
            log::trace!("redistributing key into bucket {destination}");
            if destination == sibling_id {
                self.buckets[sibling_id].place(entry);
            } else {
                self.buckets[bucket_id].place(entry);
            }
        }
    }

    /// Doubles the directory in one pass: the new half is a copy of the old
    /// half's bucket indices, then `global_depth` increments. O(2^G).
    fn double_directory(&mut self) {
        assert!(
            self.global_depth < self.max_global_depth,
            "global depth would exceed configured maximum {} (pathological key distribution?)",
            self.max_global_depth
        );
        let mut doubled = Vec::with_capacity(self.directory.len() * 2);
        doubled.extend_from_slice(&self.directory);
        doubled.extend_from_slice(&self.directory);
        self.directory = doubled;
        self.global_depth += 1;
        log::debug!("directory doubled, global_depth now {}", self.global_depth);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;

    type TestIndex = ExtendibleHashIndex<i64, &'static str, DefaultHasher>;

    /// Identity hash for `i64` keys, matching the reference's raw `(size_t)
    /// key` cast. Only `write_i64` is meaningful; used solely to reproduce the
    /// reference test suite's exact worked example, which depends on specific
    /// low bits of specific integer keys.
    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, _bytes: &[u8]) {
            unimplemented!("IdentityHasher only supports write_i64")
        }

        fn write_i64(&mut self, i: i64) {
            self.0 = i as u64;
        }
    }

    #[test]
    fn starts_at_global_depth_two_with_one_bucket_per_slot() {
        let index: TestIndex = ExtendibleHashIndex::new(2);
        assert_eq!(index.global_depth(), 2);
        assert_eq!(index.num_buckets(), 4);
        assert_eq!(index.distinct_bucket_count(), 4);
        for slot in 0..4 {
            assert_eq!(index.local_depth(slot), 2);
        }
    }

    #[test]
    fn sample_scenario_matches_reference_local_depths() {
        // Inserting 1..=9 with bucket capacity 2 and an identity hash is the
        // reference test suite's worked example: after the dust settles,
        // directory slot 1 alone has split to local depth 3 while 0, 2 and 3
        // stay at the initial depth 2.
        type IdentityIndex = ExtendibleHashIndex<i64, &'static str, IdentityHasher>;
        let mut index: IdentityIndex = ExtendibleHashIndex::new(2);
        for key in 1..=9i64 {
            index.insert(key, "v");
        }
        assert_eq!(index.local_depth(0), 2);
        assert_eq!(index.local_depth(1), 3);
        assert_eq!(index.local_depth(2), 2);
        assert_eq!(index.local_depth(3), 2);

        assert_eq!(index.find(&9), Some("v"));
        assert_eq!(index.find(&8), Some("v"));
        assert_eq!(index.find(&2), Some("v"));
        assert_eq!(index.find(&10), None);

        assert!(index.remove(&8));
        assert!(index.remove(&4));
        assert!(index.remove(&1));
        assert!(!index.remove(&20));
    }

    #[test]
    fn find_after_insert_returns_value() {
        let mut index: TestIndex = ExtendibleHashIndex::new(2);
        index.insert(4, "v4");
        index.insert(0, "v0");
        assert_eq!(index.find(&4), Some("v4"));
        assert_eq!(index.find(&0), Some("v0"));
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut index: TestIndex = ExtendibleHashIndex::new(2);
        index.insert(0, "v0");
        index.insert(0, "v00");
        assert_eq!(index.find(&0), Some("v00"));
    }

    #[test]
    fn remove_then_find_is_absent_and_reinsert_works() {
        let mut index: TestIndex = ExtendibleHashIndex::new(2);
        index.insert(0, "v0");
        assert!(index.remove(&0));
        assert_eq!(index.find(&0), None);
        index.insert(8, "v8");
        assert_eq!(index.find(&8), Some("v8"));
    }

    #[test]
    fn remove_unknown_key_returns_false_without_mutating() {
        let mut index: TestIndex = ExtendibleHashIndex::new(2);
        index.insert(1, "v1");
        assert!(!index.remove(&20));
        assert_eq!(index.find(&1), Some("v1"));
    }

    #[test]
    fn scenario_a_end_to_end() {
        let mut index: TestIndex = ExtendibleHashIndex::new(2);
        index.insert(4, "v4");
        index.insert(0, "v0");
        assert_eq!(index.find(&4), Some("v4"));
        assert_eq!(index.find(&0), Some("v0"));
        index.insert(0, "v00");
        assert_eq!(index.find(&0), Some("v00"));
        assert!(index.remove(&0));
        assert_eq!(index.find(&0), None);
        index.insert(8, "v8");
        assert_eq!(index.find(&8), Some("v8"));
        index.insert(12, "v12");
        assert!(index.global_depth() >= 2);
    }

    #[test]
    fn forces_split_when_many_keys_share_low_bits() {
        // Keys that are multiples of 4 all hash (under the identity hasher)
        // to the same low 2 bits, which is exactly the initial global depth,
        // forcing repeated splits of the same directory slot.
        type IdentityIndex = ExtendibleHashIndex<i64, &'static str, IdentityHasher>;
        let mut index: IdentityIndex = ExtendibleHashIndex::new(2);
        for i in 0..8i64 {
            index.insert(i * 4, "v");
        }
        for i in 0..8i64 {
            assert_eq!(index.find(&(i * 4)), Some("v"));
        }
        assert!(index.global_depth() > 2);
    }

    #[test]
    fn insert_and_remove_interleaved_matches_reference_map() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        // Scenario (d), §8: 10^6 interleaved operations over keys drawn
        // uniformly from [1, 10000] — wide and long enough to force several
        // rounds of directory doubling and to reach buckets whose local
        // depth lags the global depth by more than one doubling before their
        // own first split.
        let mut index: TestIndex = ExtendibleHashIndex::new(3);
        let mut reference: HashMap<i64, &'static str> = HashMap::new();
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);

        for _ in 0..1_000_000 {
            let key = rng.gen_range(1..=10_000i64);
            if rng.gen_bool(0.3) {
                assert_eq!(index.remove(&key), reference.remove(&key).is_some());
            } else {
                index.insert(key, "v");
                reference.insert(key, "v");
            }
            assert_eq!(index.find(&key), reference.get(&key).copied());
        }

        for key in 1..=10_000i64 {
            assert_eq!(index.find(&key), reference.get(&key).copied());
        }
    }

    #[test]
    #[should_panic(expected = "bucket capacity must be at least 1")]
    fn zero_capacity_panics() {
        let _index: TestIndex = ExtendibleHashIndex::new(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn local_depth_out_of_range_panics() {
        let index: TestIndex = ExtendibleHashIndex::new(2);
        index.local_depth(99);
    }
}
