//! Tool system

pub mod framework;
pub mod implementations;
pub mod registry;

pub use framework::{Tool, ToolOutcome, ToolResult, ValidationResult};
pub use registry::ToolRegistry;
