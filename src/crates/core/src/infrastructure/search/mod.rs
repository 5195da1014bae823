//! Retrieval backends used by the search tools

pub mod vector_index;
pub mod web;

pub use vector_index::{HttpVectorIndex, VectorIndex};
pub use web::{ExaSearch, WebSearchHit, WebSearchProvider, WebSearchRequest};
