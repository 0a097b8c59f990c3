//! Core types shared by the pipeline.

mod cursor;
mod document;
mod result;

pub use cursor::{CursorValue, SortDirection, SortField};
pub use document::{Annotation, Selector, WORLD_GROUP, split_userid};
pub use result::{Bucket, BucketKind, SearchResult};
