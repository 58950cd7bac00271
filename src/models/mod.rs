//! Data models.

mod retrieval;

pub use retrieval::{BackendKind, Completion, Context, QueryLanguage, SearchType};
