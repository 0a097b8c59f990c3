//! Test infrastructure for the search pipeline.
//!
//! Integration tests index fixture annotations into a [`MemoryIndex`] and
//! run real searches against it, so every assertion covers both the query a
//! stage emits and what that query actually selects.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
