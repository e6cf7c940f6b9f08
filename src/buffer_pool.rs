//! A page-table-shaped usage example for [`crate::index::ExtendibleHashIndex`].
//!
//! This mirrors the role the reference hash table plays in the original
//! buffer-pool manager it traces to: "quickly map a PageId to its
//! corresponding memory location." It's a demonstration of the index's public
//! contract, not a scope expansion of it — eviction order is tracked
//! alongside the index rather than inside it.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    index::ExtendibleHashIndex,
    util::{
        hash::FastHasher,
        types::{Page, Size},
    },
};

type PathString = String;
type PageKey = (PathString, Page);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

/// A fixed-capacity FIFO cache of page frames, keyed by `(file path, page
/// index)` and backed by an [`ExtendibleHashIndex`] as its page table.
#[derive(Debug)]
pub struct BufferPool {
    frames: ExtendibleHashIndex<PageKey, Frame, FastHasher>,
    filename_pages: HashMap<PathString, HashSet<Page>>,
    eviction_order: VecDeque<PageKey>,
    capacity: Size,
}

impl BufferPool {
    pub fn new(bucket_capacity: Size, capacity: Size) -> Self {
        Self {
            frames: ExtendibleHashIndex::new(bucket_capacity),
            filename_pages: HashMap::new(),
            eviction_order: VecDeque::new(),
            capacity,
        }
    }

    /// Number of frames currently resident.
    pub fn len(&self) -> Size {
        self.eviction_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eviction_order.is_empty()
    }

    pub fn capacity(&self) -> Size {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: Size) {
        self.capacity = capacity;
        while self.len() > self.capacity {
            self.evict_one();
        }
    }

    pub fn get(&mut self, path: &str, page_index: Page) -> Option<Vec<u8>> {
        self.frames
            .find(&(path.to_string(), page_index))
            .map(|frame| frame.bytes)
    }

    fn evict_one(&mut self) {
        let Some(key) = self.eviction_order.pop_front() else {
            return;
        };
        self.frames.remove(&key);
        if let Some(pages) = self.filename_pages.get_mut(&key.0) {
            pages.remove(&key.1);
        }
        log::debug!("evicted page {} of {}", key.1, key.0);
    }

    pub fn insert(&mut self, path: &str, page_index: Page, page_data: &[u8]) {
        let key: PageKey = (path.to_string(), page_index);
        let is_new = self.frames.find(&key).is_none();

        if is_new && self.len() >= self.capacity {
            self.evict_one();
        }

        self.frames.insert(key.clone(), Frame::new(page_data.to_vec()));
        if is_new {
            self.eviction_order.push_back(key.clone());
        }

        self.filename_pages
            .entry(path.to_string())
            .or_default()
            .insert(page_index);
    }

    /// Evicts every resident page belonging to `path`.
    pub fn remove(&mut self, path: &str) {
        if let Some(pages) = self.filename_pages.remove(path) {
            for page in pages {
                let key = (path.to_string(), page);
                self.frames.remove(&key);
                self.eviction_order.retain(|k| k != &key);
            }
        }
    }
}
