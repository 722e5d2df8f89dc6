//! Routing from a resource's declared kind to its validator.

use pipelint_core::{Kind, ValidationResult};
use pipelint_parser::Resource;
use tracing::{debug, Span};

use crate::content::ContentValidator;
use crate::pipeline::PipelineValidator;
use crate::task::TaskValidator;
use crate::Validator;

/// Validator for kinds pipelint has no rules for. Always returns an empty result.
pub struct NoopValidator {
    span: Span,
    kind: Kind,
}

impl NoopValidator {
    pub fn new(span: Span, kind: Kind) -> Self {
        Self { span, kind }
    }
}

impl Validator for NoopValidator {
    fn validate(&self) -> ValidationResult {
        self.span
            .in_scope(|| debug!(kind = %self.kind, "no validator registered for kind"));
        ValidationResult::new()
    }
}

/// Select the validator for `resource` by its declared kind.
pub fn for_kind<'a>(span: &Span, resource: &'a Resource) -> Box<dyn Validator + 'a> {
    match resource.kind() {
        Kind::Task => Box::new(TaskValidator::new(span.clone(), resource)),
        Kind::Pipeline => Box::new(PipelineValidator::new(span.clone(), resource)),
        other => Box::new(NoopValidator::new(span.clone(), other.clone())),
    }
}

/// Run content checks and the kind validator, merging content findings first.
///
/// Unsupported kinds get no checks at all, so unrelated manifests in a batch
/// never fail a run.
pub fn validate_resource(span: &Span, resource: &Resource) -> ValidationResult {
    let kind_validator = for_kind(span, resource);
    if !resource.kind().is_supported() {
        return kind_validator.validate();
    }

    let mut result = ContentValidator::new(span.clone(), resource).validate();
    result.merge(kind_validator.validate());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipelint_core::Check;
    use pipelint_parser::ResourceParser;

    const VALID_TASK: &str = r#"
---
apiVersion: tekton.dev/v1beta1
kind: Task
metadata:
  name: valid
  labels:
    app.kubernetes.io/version: a,b,c
  annotations:
    tekton.dev/tags: a,b,c
    tekton.dev/pipelines.minVersion: "0.12"
    tekton.dev/displayName: My Example Task
spec:
  description: |-
    A summary of the resource

    A para about this valid task

  steps:
  - name: hello
    image: abc.io/ubuntu:1.0
    command: [sleep, infinity]
  - name: foo-bar
    image: abc.io/fedora:1.0@sha256:deadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33f
"#;

    const VALID_PIPELINE: &str = r#"
---
apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: valid
  labels:
    app.kubernetes.io/version: a,b,c
  annotations:
    tekton.dev/tags: a,b,c
    tekton.dev/pipelines.minVersion: "0.12"
    tekton.dev/displayName: My Example Task
spec:
  description: |-
    A summary of the resource

    A para about this valid task

  tasks:
  - name: hello
    taskRef:
      name: hello
"#;

    fn parse(yaml: &str) -> Resource {
        ResourceParser::for_str(yaml).parse().unwrap()
    }

    #[test]
    fn test_for_kind_task() {
        let resource = parse(VALID_TASK);
        let result = for_kind(&Span::none(), &resource).validate();
        assert_eq!(result.errors(), 0);
        assert!(result.lints().is_empty());
    }

    #[test]
    fn test_for_kind_task_invalid_image_tag() {
        let yaml = VALID_TASK.replace("abc.io/ubuntu:1.0", "abc.io/ubuntu:latest");
        let resource = parse(&yaml);
        let result = for_kind(&Span::none(), &resource).validate();
        assert_eq!(result.errors(), 1);
        assert_eq!(result.lints()[0].check, Check::ImageTag);
    }

    #[test]
    fn test_for_kind_unknown_is_noop() {
        let resource = parse("apiVersion: v1\nkind: ConfigMap\nmetadata: {name: cm}\n");
        let result = for_kind(&Span::none(), &resource).validate();
        assert!(result.is_empty());
        assert!(validate_resource(&Span::none(), &resource).is_empty());
    }

    #[test]
    fn test_validate_resource_task() {
        let resource = parse(VALID_TASK);
        let result = validate_resource(&Span::none(), &resource);
        assert_eq!(result.errors(), 0);
        assert!(result.lints().is_empty());
    }

    #[test]
    fn test_validate_resource_pipeline() {
        let resource = parse(VALID_PIPELINE);
        let result = validate_resource(&Span::none(), &resource);
        assert_eq!(result.errors(), 0);
        assert!(result.lints().is_empty());
    }

    #[test]
    fn test_validate_resource_merges_content_first() {
        let yaml = VALID_TASK
            .replace("    tekton.dev/tags: a,b,c\n", "")
            .replace("abc.io/ubuntu:1.0", "ubuntu");
        let resource = parse(&yaml);
        let result = validate_resource(&Span::none(), &resource);

        let checks: Vec<Check> = result.lints().iter().map(|f| f.check).collect();
        assert_eq!(checks, vec![Check::Annotation, Check::ImageReference]);
        assert_eq!(result.errors(), 1);
    }

    #[test]
    fn test_validate_resource_with_active_span() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let resource = parse(VALID_PIPELINE);
        let span = tracing::info_span!("validate", file = "pipeline.yaml");
        let first = validate_resource(&span, &resource);
        let second = validate_resource(&span, &resource);
        assert_eq!(first, second);
    }
}
