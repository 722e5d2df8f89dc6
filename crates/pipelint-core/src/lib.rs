//! Core types for the pipelint manifest validator.
//!
//! This crate provides the types shared by every pipelint component:
//! - Resource kinds (Kind)
//! - Checks that produce findings (Check)
//! - Findings and their severity (Finding, Severity)
//! - The aggregated result of a validation pass (ValidationResult)

mod check;
mod finding;
mod kind;
mod result;

pub use check::Check;
pub use finding::{Finding, Severity};
pub use kind::Kind;
pub use result::ValidationResult;
