//! Catalog metadata conventions shared by every resource kind.

use pipelint_core::{Check, ValidationResult};
use pipelint_parser::{Content, Resource};
use tracing::Span;

use crate::Validator;

pub const VERSION_LABEL: &str = "app.kubernetes.io/version";
pub const MIN_VERSION_ANNOTATION: &str = "tekton.dev/pipelines.minVersion";
pub const TAGS_ANNOTATION: &str = "tekton.dev/tags";
pub const DISPLAY_NAME_ANNOTATION: &str = "tekton.dev/displayName";

const MAX_SUMMARY_LENGTH: usize = 80;

/// Checks labels, annotations and description of any resource.
pub struct ContentValidator<'a> {
    span: Span,
    resource: &'a Resource,
}

impl<'a> ContentValidator<'a> {
    pub fn new(span: Span, resource: &'a Resource) -> Self {
        Self { span, resource }
    }
}

impl Validator for ContentValidator<'_> {
    fn validate(&self) -> ValidationResult {
        self.span.in_scope(|| {
            let mut result = ValidationResult::new();

            let content = match self.resource.to_content() {
                Ok(content) => content,
                Err(err) => {
                    result.error(
                        Check::Decode,
                        format!("failed to decode resource content - {}", err),
                    );
                    return result;
                }
            };

            let id = format!("{} - {}", self.resource.kind(), content.metadata.name);
            check_labels(&mut result, &id, &content);
            check_annotations(&mut result, &id, &content);
            check_description(&mut result, &id, &content);
            result
        })
    }
}

fn check_labels(result: &mut ValidationResult, id: &str, content: &Content) {
    if !content.metadata.labels.contains_key(VERSION_LABEL) {
        result.error(
            Check::Label,
            format!(
                "Resource {} is missing mandatory label - {}",
                id, VERSION_LABEL
            ),
        );
    }
}

fn check_annotations(result: &mut ValidationResult, id: &str, content: &Content) {
    let annotations = &content.metadata.annotations;
    if !annotations.contains_key(MIN_VERSION_ANNOTATION) {
        result.error(
            Check::Annotation,
            format!(
                "Resource {} is missing mandatory annotation - {}",
                id, MIN_VERSION_ANNOTATION
            ),
        );
    }
    if !annotations.contains_key(TAGS_ANNOTATION) {
        result.warn(
            Check::Annotation,
            format!(
                "Resource {} has no tags; add the annotation - {}",
                id, TAGS_ANNOTATION
            ),
        );
    }
    if !annotations.contains_key(DISPLAY_NAME_ANNOTATION) {
        result.info(
            Check::Annotation,
            format!(
                "Resource {} could set a human readable name with the annotation - {}",
                id, DISPLAY_NAME_ANNOTATION
            ),
        );
    }
}

fn check_description(result: &mut ValidationResult, id: &str, content: &Content) {
    let description = content.description.trim();
    if description.is_empty() {
        result.error(
            Check::Description,
            format!("Resource {} is missing a description", id),
        );
        return;
    }

    let summary = description.lines().next().unwrap_or_default();
    if summary.chars().count() > MAX_SUMMARY_LENGTH {
        result.warn(
            Check::Description,
            format!(
                "Resource {} description summary is longer than {} characters; keep the first line short",
                id, MAX_SUMMARY_LENGTH
            ),
        );
    }
}
