//! Manifest parser for pipelint.
//!
//! This crate provides:
//! - Decoding of YAML byte streams into generic resources
//! - Conversion of generic resources into typed Task and Pipeline schemas
//! - The kind-agnostic content view used for metadata checks

mod error;
mod parser;
mod resource;
mod schema;

pub use error::ParseError;
pub use parser::ResourceParser;
pub use resource::{Content, Resource, TypedResource, SUPPORTED_API_VERSIONS};
pub use schema::{
    ObjectMeta, Param, ParamSpec, Pipeline, PipelineSpec, PipelineTask, Step, Task, TaskRef,
    TaskSpec, WorkspaceDeclaration,
};

pub use pipelint_core::Kind;
