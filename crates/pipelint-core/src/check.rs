//! Check definitions.

use serde::{Deserialize, Serialize};

/// Identifies the rule that produced a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    /// The resource could not be decoded into the shape its kind requires
    Decode,
    /// A step image is not a well-formed, fully qualified reference
    ImageReference,
    /// A step image uses a floating tag
    ImageTag,
    /// The resource description is missing or badly shaped
    Description,
    /// A mandatory catalog label is missing
    Label,
    /// A catalog annotation is missing
    Annotation,
    /// A pipeline task is malformed
    PipelineTask,
    /// A pipeline task depends on a task that does not exist
    RunAfter,
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl Check {
    /// All checks, in the order their rules are listed in reports.
    pub const ALL: [Check; 8] = [
        Check::Decode,
        Check::ImageReference,
        Check::ImageTag,
        Check::Description,
        Check::Label,
        Check::Annotation,
        Check::PipelineTask,
        Check::RunAfter,
    ];

    /// Stable rule identifier
    pub fn id(&self) -> &'static str {
        match self {
            Check::Decode => "decode",
            Check::ImageReference => "image-reference",
            Check::ImageTag => "image-tag",
            Check::Description => "description",
            Check::Label => "label",
            Check::Annotation => "annotation",
            Check::PipelineTask => "pipeline-task",
            Check::RunAfter => "run-after",
        }
    }

    /// One-line description used for report rule metadata
    pub fn description(&self) -> &'static str {
        match self {
            Check::Decode => "Resource must decode into the schema of its kind",
            Check::ImageReference => {
                "Step images must be fully qualified references with an explicit registry and tag or digest"
            }
            Check::ImageTag => "Step images must be pinned to a specific version instead of latest",
            Check::Description => "Resources must carry a description with a short summary line",
            Check::Label => "Resources must carry the mandatory catalog labels",
            Check::Annotation => "Resources should carry the catalog annotations",
            Check::PipelineTask => "Pipeline tasks must be named uniquely and reference or embed a task",
            Check::RunAfter => "Pipeline task ordering must only reference declared tasks",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_display() {
        assert_eq!(format!("{}", Check::ImageTag), "image-tag");
        assert_eq!(format!("{}", Check::RunAfter), "run-after");
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: std::collections::HashSet<&str> = Check::ALL.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), Check::ALL.len());
    }

    #[test]
    fn test_serde_uses_rule_id() {
        let json = serde_json::to_string(&Check::ImageReference).unwrap();
        assert_eq!(json, "\"image-reference\"");
    }
}
