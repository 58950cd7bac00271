//! Business logic services.
//!
//! Services orchestrate retrievers and provide high-level operations.

mod search;

pub use search::SearchService;
