//! Infrastructure layer - external providers reached over HTTP

pub mod ai;
pub mod search;

pub use ai::{ModelProvider, ModelRequest, ModelStream, OpenAiModelProvider, OpenAiModelSettings};
pub use search::{
    ExaSearch, HttpVectorIndex, VectorIndex, WebSearchHit, WebSearchProvider, WebSearchRequest,
};
