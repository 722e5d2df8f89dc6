//! Manifest validation for pipelint.
//!
//! This crate provides:
//! - Strict container image reference parsing and the tag-pinning policy
//! - Validators for Task and Pipeline resources
//! - Kind-agnostic catalog content checks
//! - Dispatch from a resource's declared kind to its validator

mod content;
mod dispatch;
mod image;
mod pipeline;
mod reference;
mod task;

pub use content::ContentValidator;
pub use dispatch::{for_kind, validate_resource, NoopValidator};
pub use image::check_image;
pub use pipeline::PipelineValidator;
pub use reference::{NameError, Reference, ReferenceError};
pub use task::TaskValidator;

pub use pipelint_core::{Check, Finding, Severity, ValidationResult};

/// A validator bound to one resource.
pub trait Validator {
    fn validate(&self) -> ValidationResult;
}
