//! Data models: finding schema and error types

pub mod errors;
pub mod finding;

pub use errors::{AppError, AppResult, ErrorCode};
pub use finding::{EntityType, Finding, FindingType, Label, Severity};
