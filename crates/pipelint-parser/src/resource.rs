//! Generic decoded resources and their typed conversions.

use pipelint_core::Kind;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::ParseError;
use crate::schema::{ObjectMeta, Pipeline, Task};

/// API versions whose schema pipelint understands.
pub const SUPPORTED_API_VERSIONS: &[&str] = &["tekton.dev/v1beta1", "tekton.dev/v1"];

/// A decoded manifest document with its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    api_version: String,
    kind: Kind,
    name: String,
    document: Value,
}

/// A resource converted into the typed schema of its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedResource {
    Task(Task),
    Pipeline(Pipeline),
}

/// Kind-agnostic view of a resource used for catalog metadata checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    pub metadata: ObjectMeta,
    pub description: String,
}

#[derive(Deserialize)]
struct ContentShape {
    metadata: ObjectMeta,
    #[serde(default)]
    spec: Option<DescribedSpec>,
}

#[derive(Deserialize)]
struct DescribedSpec {
    #[serde(default)]
    description: Option<String>,
}

impl Resource {
    /// Build a resource from one YAML document.
    pub fn from_value(document: Value) -> Result<Self, ParseError> {
        if !document.is_mapping() {
            return Err(ParseError::NotAMapping);
        }

        let api_version = document
            .get("apiVersion")
            .and_then(Value::as_str)
            .ok_or(ParseError::MissingField("apiVersion"))?
            .to_string();
        let kind = document
            .get("kind")
            .and_then(Value::as_str)
            .map(Kind::from)
            .ok_or(ParseError::MissingField("kind"))?;
        let name = document
            .get("metadata")
            .and_then(|metadata| metadata.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            api_version,
            kind,
            name,
            document,
        })
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw document content.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Convert into the typed schema selected by the declared kind.
    pub fn to_type(&self) -> Result<TypedResource, ParseError> {
        match &self.kind {
            Kind::Task => self.to_task().map(TypedResource::Task),
            Kind::Pipeline => self.to_pipeline().map(TypedResource::Pipeline),
            other => Err(ParseError::UnsupportedKind(other.clone())),
        }
    }

    pub fn to_task(&self) -> Result<Task, ParseError> {
        self.decode(Kind::Task)
    }

    pub fn to_pipeline(&self) -> Result<Pipeline, ParseError> {
        self.decode(Kind::Pipeline)
    }

    /// Decode metadata and description regardless of kind.
    pub fn to_content(&self) -> Result<Content, ParseError> {
        let shape: ContentShape =
            serde_yaml::from_value(self.document.clone()).map_err(ParseError::Schema)?;
        Ok(Content {
            metadata: shape.metadata,
            description: shape
                .spec
                .and_then(|spec| spec.description)
                .unwrap_or_default(),
        })
    }

    fn decode<T: DeserializeOwned>(&self, expected: Kind) -> Result<T, ParseError> {
        if self.kind != expected {
            return Err(ParseError::KindMismatch {
                expected,
                found: self.kind.clone(),
            });
        }
        if !SUPPORTED_API_VERSIONS.contains(&self.api_version.as_str()) {
            return Err(ParseError::UnsupportedApiVersion(self.api_version.clone()));
        }
        serde_yaml::from_value(self.document.clone()).map_err(ParseError::Schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(yaml: &str) -> Resource {
        Resource::from_value(serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    const TASK: &str = r#"
apiVersion: tekton.dev/v1beta1
kind: Task
metadata:
  name: hello
  labels:
    app.kubernetes.io/version: "0.1"
spec:
  description: Says hello
  steps:
  - name: greet
    image: abc.io/ubuntu:1.0
    command: [echo, hello]
"#;

    #[test]
    fn test_from_value_reads_header() {
        let res = resource(TASK);
        assert_eq!(res.api_version(), "tekton.dev/v1beta1");
        assert_eq!(res.kind(), &Kind::Task);
        assert_eq!(res.name(), "hello");
    }

    #[test]
    fn test_from_value_requires_kind() {
        let value: Value = serde_yaml::from_str("apiVersion: v1\nmetadata: {name: x}\n").unwrap();
        let err = Resource::from_value(value).unwrap_err();
        assert!(matches!(err, ParseError::MissingField("kind")));
    }

    #[test]
    fn test_from_value_rejects_scalars() {
        let value: Value = serde_yaml::from_str("just a string").unwrap();
        assert!(matches!(
            Resource::from_value(value),
            Err(ParseError::NotAMapping)
        ));
    }

    #[test]
    fn test_to_task_decodes_steps() {
        let task = resource(TASK).to_task().unwrap();
        assert_eq!(task.metadata.name, "hello");
        assert_eq!(task.spec.steps.len(), 1);
        assert_eq!(task.spec.steps[0].image, "abc.io/ubuntu:1.0");
        assert_eq!(task.spec.steps[0].command, vec!["echo", "hello"]);
    }

    #[test]
    fn test_to_type_is_tagged_by_kind() {
        match resource(TASK).to_type().unwrap() {
            TypedResource::Task(task) => assert_eq!(task.spec.description, "Says hello"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_to_pipeline_on_task_is_kind_mismatch() {
        let err = resource(TASK).to_pipeline().unwrap_err();
        assert_eq!(err.to_string(), "expected kind Pipeline, found Task");
    }

    #[test]
    fn test_to_type_rejects_unknown_kind() {
        let res = resource("apiVersion: v1\nkind: ConfigMap\nmetadata: {name: cm}\n");
        let err = res.to_type().unwrap_err();
        assert_eq!(err.to_string(), "kind ConfigMap has no typed schema");
    }

    #[test]
    fn test_unsupported_api_version() {
        let res = resource("apiVersion: tekton.dev/v1alpha1\nkind: Task\nmetadata: {name: t}\nspec: {}\n");
        assert!(matches!(
            res.to_task(),
            Err(ParseError::UnsupportedApiVersion(v)) if v == "tekton.dev/v1alpha1"
        ));
    }

    #[test]
    fn test_missing_spec_is_schema_error() {
        let res = resource("apiVersion: tekton.dev/v1\nkind: Task\nmetadata: {name: t}\n");
        let err = res.to_task().unwrap_err();
        assert!(matches!(err, ParseError::Schema(_)));
        assert!(err.to_string().contains("spec"));
    }

    #[test]
    fn test_mistyped_steps_is_schema_error() {
        let res = resource("apiVersion: tekton.dev/v1\nkind: Task\nmetadata: {name: t}\nspec:\n  steps: nope\n");
        assert!(matches!(res.to_task(), Err(ParseError::Schema(_))));
    }

    #[test]
    fn test_to_content_without_spec() {
        let res = resource("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm\n  labels: {a: b}\n");
        let content = res.to_content().unwrap();
        assert_eq!(content.metadata.labels.get("a").map(String::as_str), Some("b"));
        assert_eq!(content.description, "");
    }
}
