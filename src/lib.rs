//! An in-memory associative container built on extendible hashing, plus a
//! small buffer-pool example showing its intended use as a page table.

pub mod buffer_pool;
pub mod config;
pub mod index;
pub mod util;

pub use config::IndexConfig;
pub use index::ExtendibleHashIndex;
