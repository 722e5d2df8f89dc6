use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use pipelint_core::{Check, ValidationResult};

/// Validation outcome of one resource, or of a file that failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub result: ValidationResult,
}

impl ResourceReport {
    fn label(&self) -> String {
        match (&self.kind, &self.name) {
            (Some(kind), Some(name)) => format!("{} ({}/{})", self.path.display(), kind, name),
            _ => self.path.display().to_string(),
        }
    }
}

/// Results of a whole run, in the order files were given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub reports: Vec<ResourceReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ValidationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn add_resource(
        &mut self,
        path: impl Into<PathBuf>,
        kind: impl Into<String>,
        name: impl Into<String>,
        result: ValidationResult,
    ) {
        self.reports.push(ResourceReport {
            path: path.into(),
            kind: Some(kind.into()),
            name: Some(name.into()),
            result,
        });
    }

    /// Record a file that could not be decoded into resources.
    pub fn add_parse_failure(&mut self, path: impl Into<PathBuf>, error: impl Display) {
        let mut result = ValidationResult::new();
        result.error(Check::Decode, format!("failed to parse manifest - {}", error));
        self.reports.push(ResourceReport {
            path: path.into(),
            kind: None,
            name: None,
            result,
        });
    }

    pub fn total_errors(&self) -> usize {
        self.reports.iter().map(|r| r.result.errors()).sum()
    }

    pub fn total_warnings(&self) -> usize {
        self.reports.iter().map(|r| r.result.warnings()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors() > 0
    }

    /// Distinct files covered by this summary.
    pub fn files(&self) -> BTreeSet<&Path> {
        self.reports.iter().map(|r| r.path.as_path()).collect()
    }

    /// Render one line per finding followed by a totals line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for report in &self.reports {
            let label = report.label();
            for finding in report.result.lints() {
                out.push_str(&format!(
                    "{:<5} {}: {}\n",
                    finding.severity.to_string(),
                    label,
                    finding.message
                ));
            }
        }

        out.push_str(&format!(
            "{} file(s), {} resource(s): {} error(s), {} advisory finding(s)\n",
            self.files().len(),
            self.reports.iter().filter(|r| r.kind.is_some()).count(),
            self.total_errors(),
            self.total_warnings()
        ));
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidationSummary {
        let mut summary = ValidationSummary::new();

        let mut task = ValidationResult::new();
        task.error(
            Check::ImageTag,
            "Task image (abc.io/fedora:latest) must be tagged with a specific version",
        );
        task.warn(Check::Annotation, "Resource Task - build has no tags");
        summary.add_resource("task/build.yaml", "Task", "build", task);

        summary.add_resource("pipeline/ci.yaml", "Pipeline", "ci", ValidationResult::new());
        summary.add_parse_failure("broken.yaml", "invalid YAML: bad indentation");
        summary
    }

    #[test]
    fn test_totals() {
        let summary = sample();
        assert_eq!(summary.total_errors(), 2);
        assert_eq!(summary.total_warnings(), 1);
        assert!(summary.has_errors());
        assert_eq!(summary.files().len(), 3);
    }

    #[test]
    fn test_to_text() {
        insta::assert_snapshot!(sample().to_text(), @r"
        ERROR task/build.yaml (Task/build): Task image (abc.io/fedora:latest) must be tagged with a specific version
        WARN  task/build.yaml (Task/build): Resource Task - build has no tags
        ERROR broken.yaml: failed to parse manifest - invalid YAML: bad indentation
        3 file(s), 2 resource(s): 2 error(s), 1 advisory finding(s)
        ");
    }

    #[test]
    fn test_empty_summary_passes() {
        let summary = ValidationSummary::new();
        assert!(!summary.has_errors());
        assert_eq!(
            summary.to_text(),
            "0 file(s), 0 resource(s): 0 error(s), 0 advisory finding(s)\n"
        );
    }

    #[test]
    fn test_json_round_trip() {
        let summary = sample();
        let json = summary.to_json().unwrap();
        let parsed: ValidationSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.reports, summary.reports);
        assert!(json.contains("\"image-tag\""));
    }
}
