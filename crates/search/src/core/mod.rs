//! Capability traits at the seams of the pipeline.
//!
//! - [`Modifier`] and [`Aggregation`] - the two kinds of pipeline stage
//! - [`SearchEngine`] - executes a finished query body
//! - [`GroupService`] and [`UriEquivalence`] - collaborators consulted
//!   while a query is being built

mod engine;
mod services;
mod stage;

pub use engine::SearchEngine;
pub use services::{GroupService, UriEquivalence};
pub use stage::{Aggregation, Modifier};
