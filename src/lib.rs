pub mod cli;
pub mod config;

// Re-export core types for convenience
pub use pipelint_core::{Check, Finding, Kind, Severity, ValidationResult};
pub use pipelint_reports::ValidationSummary;
