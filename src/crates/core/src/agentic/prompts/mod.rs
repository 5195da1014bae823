//! System prompt assembly

pub mod composer;
pub mod segments;

pub use composer::{convert_history, PromptBundle, PromptComposer, PromptSegment};
