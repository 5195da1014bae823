//! Language model access

pub mod provider;

pub use provider::{
    ModelProvider, ModelRequest, ModelStream, OpenAiModelProvider, OpenAiModelSettings,
};
