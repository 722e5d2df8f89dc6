use std::collections::HashSet;

use pipelint_core::{Check, ValidationResult};
use pipelint_parser::{PipelineTask, Resource};
use tracing::{debug, Span};

use crate::image::check_image;
use crate::Validator;

/// Checks the task graph of a Pipeline.
pub struct PipelineValidator<'a> {
    span: Span,
    resource: &'a Resource,
}

impl<'a> PipelineValidator<'a> {
    pub fn new(span: Span, resource: &'a Resource) -> Self {
        Self { span, resource }
    }
}

impl Validator for PipelineValidator<'_> {
    fn validate(&self) -> ValidationResult {
        self.span.in_scope(|| {
            let mut result = ValidationResult::new();

            let pipeline = match self.resource.to_pipeline() {
                Ok(pipeline) => pipeline,
                Err(err) => {
                    result.error(Check::Decode, format!("failed to decode pipeline - {}", err));
                    return result;
                }
            };

            // runAfter may only point at regular tasks, never at finally tasks
            let declared: HashSet<&str> = pipeline
                .spec
                .tasks
                .iter()
                .map(|task| task.name.as_str())
                .filter(|name| !name.is_empty())
                .collect();

            let mut seen = HashSet::new();
            let all_tasks = pipeline.spec.tasks.iter().chain(&pipeline.spec.finally);
            for (index, task) in all_tasks.enumerate() {
                debug!(task = %task.name, "checking pipeline task");
                check_name(&mut result, &mut seen, index, task);
                check_task_source(&mut result, task);
                check_run_after(&mut result, &declared, task);
                if let Some(spec) = &task.task_spec {
                    for step in &spec.steps {
                        result.extend(check_image(&step.image));
                    }
                }
            }

            result
        })
    }
}

fn check_name<'t>(
    result: &mut ValidationResult,
    seen: &mut HashSet<&'t str>,
    index: usize,
    task: &'t PipelineTask,
) {
    if task.name.is_empty() {
        result.error(
            Check::PipelineTask,
            format!("Pipeline task at position {} has no name", index + 1),
        );
    } else if !seen.insert(task.name.as_str()) {
        result.error(
            Check::PipelineTask,
            format!("Pipeline task name ({}) is used more than once", task.name),
        );
    }
}

fn check_task_source(result: &mut ValidationResult, task: &PipelineTask) {
    match (&task.task_ref, &task.task_spec) {
        (None, None) => result.error(
            Check::PipelineTask,
            format!(
                "Pipeline task ({}) must reference a task or embed a task spec",
                task.name
            ),
        ),
        (Some(_), Some(_)) => result.error(
            Check::PipelineTask,
            format!(
                "Pipeline task ({}) must not set both taskRef and taskSpec",
                task.name
            ),
        ),
        _ => {}
    }
}

fn check_run_after(result: &mut ValidationResult, declared: &HashSet<&str>, task: &PipelineTask) {
    for dependency in &task.run_after {
        if !declared.contains(dependency.as_str()) {
            result.error(
                Check::RunAfter,
                format!(
                    "Pipeline task ({}) runs after unknown task ({})",
                    task.name, dependency
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipelint_parser::ResourceParser;

    const VALID_PIPELINE: &str = r#"
---
apiVersion: tekton.dev/v1beta1
kind: Pipeline
metadata:
  name: valid
spec:
  tasks:
  - name: hello
    taskRef:
      name: hello
  - name: world
    runAfter: [hello]
    taskSpec:
      steps:
      - name: echo
        image: abc.io/ubuntu:1.0
  finally:
  - name: cleanup
    taskRef:
      name: cleanup
"#;

    const BROKEN_PIPELINE: &str = r#"
apiVersion: tekton.dev/v1
kind: Pipeline
metadata:
  name: broken
spec:
  tasks:
  - name: build
    taskRef:
      name: build
  - name: build
    taskRef:
      name: build
  - taskRef:
      name: anonymous
  - name: orphan
    runAfter: [build, deploy]
  - name: both
    taskRef:
      name: x
    taskSpec:
      steps:
      - image: abc.io/tool:latest
"#;

    fn validate(yaml: &str) -> ValidationResult {
        let resource = ResourceParser::for_str(yaml).parse().unwrap();
        PipelineValidator::new(Span::none(), &resource).validate()
    }

    #[test]
    fn test_valid_pipeline() {
        let result = validate(VALID_PIPELINE);
        assert!(result.is_empty(), "{:?}", result.lints());
    }

    #[test]
    fn test_broken_pipeline_reports_every_problem_in_order() {
        let result = validate(BROKEN_PIPELINE);
        let messages: Vec<&str> = result.lints().iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Pipeline task name (build) is used more than once",
                "Pipeline task at position 3 has no name",
                "Pipeline task (orphan) must reference a task or embed a task spec",
                "Pipeline task (orphan) runs after unknown task (deploy)",
                "Pipeline task (both) must not set both taskRef and taskSpec",
                "Task image (abc.io/tool:latest) must be tagged with a specific version",
            ]
        );
        assert_eq!(result.errors(), 6);
    }

    #[test]
    fn test_finally_cannot_be_a_run_after_target() {
        let result = validate(
            r#"
apiVersion: tekton.dev/v1
kind: Pipeline
metadata: {name: p}
spec:
  tasks:
  - name: build
    taskRef: {name: build}
    runAfter: [notify]
  finally:
  - name: notify
    taskRef: {name: notify}
"#,
        );
        assert_eq!(result.errors(), 1);
        assert_eq!(result.lints()[0].check, Check::RunAfter);
    }

    #[test]
    fn test_decode_failure() {
        let result = validate("apiVersion: tekton.dev/v1\nkind: Task\nmetadata: {name: t}\nspec: {}\n");
        assert_eq!(result.errors(), 1);
        assert_eq!(
            result.lints()[0].message,
            "failed to decode pipeline - expected kind Pipeline, found Task"
        );
    }
}
