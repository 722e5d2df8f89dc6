//! Report generation for pipelint.
//!
//! This crate provides the report formats:
//! - Plain text and JSON summaries
//! - SARIF (Static Analysis Results Interchange Format)

pub mod sarif;
pub mod summary;

pub use sarif::{SarifReport, SarifResult};
pub use summary::{ResourceReport, ValidationSummary};
