//! Vector index, persistence, and similarity search

pub mod index;
pub mod store;

pub use index::{HnswParams, SearchHit, VectorIndex};
pub use store::{IndexStore, LoadOutcome};
