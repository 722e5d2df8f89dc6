//! Aggregated validation result.

use serde::{Deserialize, Serialize};

use crate::check::Check;
use crate::finding::{Finding, Severity};

/// Findings of one validation pass, in the order the checks ran.
///
/// `errors` always equals the number of error-severity findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedResult")]
pub struct ValidationResult {
    lints: Vec<Finding>,
    errors: usize,
}

/// Wire shape of a result. A stored `errors` field is ignored and recounted.
#[derive(Deserialize)]
struct SerializedResult {
    #[serde(default)]
    lints: Vec<Finding>,
}

impl From<SerializedResult> for ValidationResult {
    fn from(serialized: SerializedResult) -> Self {
        serialized.lints.into_iter().collect()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding, counting it if it is an error.
    pub fn push(&mut self, finding: Finding) {
        if finding.severity.is_error() {
            self.errors += 1;
        }
        self.lints.push(finding);
    }

    pub fn error(&mut self, check: Check, message: impl Into<String>) {
        self.push(Finding::error(check, message));
    }

    pub fn warn(&mut self, check: Check, message: impl Into<String>) {
        self.push(Finding::warning(check, message));
    }

    pub fn info(&mut self, check: Check, message: impl Into<String>) {
        self.push(Finding::info(check, message));
    }

    /// Append every finding of `other` after the findings already held.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors += other.errors;
        self.lints.extend(other.lints);
    }

    pub fn lints(&self) -> &[Finding] {
        &self.lints
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Number of advisory (non-error) findings.
    pub fn warnings(&self) -> usize {
        self.lints.len() - self.errors
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lints.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.lints.iter().filter(|f| f.severity == severity).count()
    }
}

impl Extend<Finding> for ValidationResult {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        for finding in iter {
            self.push(finding);
        }
    }
}

impl FromIterator<Finding> for ValidationResult {
    fn from_iter<I: IntoIterator<Item = Finding>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}
