//! Utility layer - errors and small text helpers

pub mod errors;
pub mod text;

pub use errors::{CampusError, CampusResult};
pub use text::{collapse_whitespace, truncate_chars};
