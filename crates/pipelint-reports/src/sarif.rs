use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::summary::ValidationSummary;
use pipelint_core::{Check, Finding, Severity};

/// SARIF (Static Analysis Results Interchange Format) v2.1.0 implementation
/// Spec: https://docs.oasis-open.org/sarif/sarif/v2.1.0/sarif-v2.1.0.html

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Vec<SarifArtifact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocations: Option<Vec<SarifInvocation>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri", skip_serializing_if = "Option::is_none")]
    pub information_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<SarifRule>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription", skip_serializing_if = "Option::is_none")]
    pub short_description: Option<SarifMessage>,
    #[serde(rename = "defaultConfiguration", skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<SarifConfiguration>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifConfiguration {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    #[serde(rename = "ruleIndex")]
    pub rule_index: usize,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    #[serde(rename = "partialFingerprints", skip_serializing_if = "Option::is_none")]
    pub fingerprints: Option<HashMap<String, String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
    #[serde(rename = "logicalLocations", skip_serializing_if = "Option::is_none")]
    pub logical_locations: Option<Vec<SarifLogicalLocation>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarifLogicalLocation {
    #[serde(rename = "fullyQualifiedName")]
    pub fully_qualified_name: String,
    pub kind: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifArtifact {
    pub location: SarifArtifactLocation,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SarifInvocation {
    #[serde(rename = "executionSuccessful")]
    pub execution_successful: bool,
    #[serde(rename = "startTimeUtc", skip_serializing_if = "Option::is_none")]
    pub start_time_utc: Option<String>,
    #[serde(rename = "endTimeUtc", skip_serializing_if = "Option::is_none")]
    pub end_time_utc: Option<String>,
}

impl SarifReport {
    /// Create a new SARIF report from a validation summary
    pub fn from_validation_summary(summary: &ValidationSummary, version: &str) -> Self {
        let mut rules = Vec::new();
        let mut results = Vec::new();
        let mut artifacts: Vec<SarifArtifact> = Vec::new();
        let mut rule_map = HashMap::new();
        let mut artifact_map: HashMap<String, usize> = HashMap::new();

        // Rules are listed in check order, only for checks that fired
        for check in Check::ALL {
            let fired = summary
                .reports
                .iter()
                .any(|report| report.result.lints().iter().any(|f| f.check == check));
            if fired {
                rule_map.insert(check, rules.len());
                rules.push(create_rule_for_check(check));
            }
        }

        for report in &summary.reports {
            let uri = report.path.to_string_lossy().to_string();
            let artifact_index = *artifact_map.entry(uri.clone()).or_insert_with(|| {
                artifacts.push(SarifArtifact {
                    location: SarifArtifactLocation {
                        uri: uri.clone(),
                        index: Some(artifacts.len()),
                    },
                    mime_type: Some("application/yaml".to_string()),
                });
                artifacts.len() - 1
            });

            let logical_locations = match (&report.kind, &report.name) {
                (Some(kind), Some(name)) => Some(vec![SarifLogicalLocation {
                    fully_qualified_name: format!("{}/{}", kind, name),
                    kind: "resource".to_string(),
                }]),
                _ => None,
            };

            for finding in report.result.lints() {
                let Some(&rule_index) = rule_map.get(&finding.check) else {
                    continue;
                };
                results.push(SarifResult {
                    rule_id: finding.check.id().to_string(),
                    rule_index,
                    level: severity_to_level(finding.severity).to_string(),
                    message: SarifMessage {
                        text: finding.message.clone(),
                    },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation {
                                uri: uri.clone(),
                                index: Some(artifact_index),
                            },
                        },
                        logical_locations: logical_locations.clone(),
                    }],
                    fingerprints: Some(generate_fingerprints(&report.path, finding)),
                });
            }
        }

        SarifReport {
            schema: SARIF_SCHEMA.to_string(),
            version: "2.1.0".to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "pipelint".to_string(),
                        version: version.to_string(),
                        information_uri: Some("https://github.com/pipelint/pipelint".to_string()),
                        rules: Some(rules),
                    },
                },
                results,
                artifacts: Some(artifacts),
                invocations: Some(vec![SarifInvocation {
                    execution_successful: true,
                    start_time_utc: summary.started_at.map(|t| t.to_rfc3339()),
                    end_time_utc: summary.finished_at.map(|t| t.to_rfc3339()),
                }]),
            }],
        }
    }

    /// Export SARIF report to JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save SARIF report to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json)?;
        tracing::debug!("Wrote SARIF report to {}", path.as_ref().display());
        Ok(())
    }

    /// Load SARIF report from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let report: SarifReport = serde_json::from_str(json)?;
        Ok(report)
    }
}

fn create_rule_for_check(check: Check) -> SarifRule {
    let level = match check {
        Check::Annotation => "warning",
        _ => "error",
    };
    SarifRule {
        id: check.id().to_string(),
        name: check.id().to_string(),
        short_description: Some(SarifMessage {
            text: check.description().to_string(),
        }),
        default_configuration: Some(SarifConfiguration {
            level: level.to_string(),
        }),
    }
}

fn severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

fn generate_fingerprints(path: &Path, finding: &Finding) -> HashMap<String, String> {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update(b":");
    hasher.update(finding.check.id().as_bytes());
    hasher.update(b":");
    hasher.update(finding.message.as_bytes());

    let mut fingerprints = HashMap::new();
    fingerprints.insert(
        "pipelint/v1".to_string(),
        format!("{:x}", hasher.finalize()),
    );
    fingerprints
}
