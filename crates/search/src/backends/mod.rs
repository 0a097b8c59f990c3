//! Search engine implementations.
//!
//! | Engine | Description |
//! |--------|-------------|
//! | [`MemoryIndex`] | In-process index for tests, fixtures and the CLI |
//!
//! A production deployment plugs its own Elasticsearch client in behind
//! [`SearchEngine`](crate::core::SearchEngine).

pub mod memory;

pub use memory::MemoryIndex;
