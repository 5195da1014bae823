//! Configuration
//!
//! TOML file with per-section defaults, environment overrides for secrets.

pub mod loader;
pub mod types;

pub use loader::CONFIG_PATH_ENV;
pub use types::*;
