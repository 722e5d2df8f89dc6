use pipelint_core::{Check, ValidationResult};
use pipelint_parser::Resource;
use tracing::{debug, Span};

use crate::image::check_image;
use crate::Validator;

/// Checks every step image of a Task.
pub struct TaskValidator<'a> {
    span: Span,
    resource: &'a Resource,
}

impl<'a> TaskValidator<'a> {
    pub fn new(span: Span, resource: &'a Resource) -> Self {
        Self { span, resource }
    }
}

impl Validator for TaskValidator<'_> {
    fn validate(&self) -> ValidationResult {
        self.span.in_scope(|| {
            let mut result = ValidationResult::new();

            let task = match self.resource.to_task() {
                Ok(task) => task,
                Err(err) => {
                    result.error(Check::Decode, format!("failed to decode task - {}", err));
                    return result;
                }
            };

            for step in &task.spec.steps {
                debug!(step = %step.name, image = %step.image, "checking step image");
                result.extend(check_image(&step.image));
            }

            result
        })
    }
}
