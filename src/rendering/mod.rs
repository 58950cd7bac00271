//! Prompt template loading and rendering.

mod prompt_store;

pub use prompt_store::{PromptStore, render_template};
