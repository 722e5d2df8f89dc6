//! Resource kind definitions.

use serde::{Deserialize, Serialize};

/// Declared `kind` of a manifest document.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(from = "String", into = "String")]
pub enum Kind {
    Task,
    Pipeline,
    /// Any kind without a dedicated validator
    Other(String),
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Task => write!(f, "Task"),
            Kind::Pipeline => write!(f, "Pipeline"),
            Kind::Other(name) => write!(f, "{}", name),
        }
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        match s {
            "Task" => Kind::Task,
            "Pipeline" => Kind::Pipeline,
            other => Kind::Other(other.to_string()),
        }
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Kind::from(s.as_str())
    }
}

impl From<Kind> for String {
    fn from(kind: Kind) -> Self {
        kind.to_string()
    }
}

impl Kind {
    /// Whether pipelint ships a validator for this kind
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Kind::Other(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_string() {
        assert_eq!(Kind::from("Task"), Kind::Task);
        assert_eq!(Kind::from("Pipeline"), Kind::Pipeline);
        assert_eq!(Kind::from("ConfigMap"), Kind::Other("ConfigMap".to_string()));
        assert_eq!(Kind::Other("ConfigMap".to_string()).to_string(), "ConfigMap");
    }

    #[test]
    fn test_kind_is_case_sensitive() {
        assert_eq!(Kind::from("task"), Kind::Other("task".to_string()));
        assert!(!Kind::from("task").is_supported());
        assert!(Kind::Task.is_supported());
    }
}
