use pipelint_core::Kind;
use thiserror::Error;

/// Errors raised while decoding manifests.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no documents found")]
    Empty,

    #[error("document is not a mapping")]
    NotAMapping,

    #[error("document has no {0} field")]
    MissingField(&'static str),

    #[error("expected kind {expected}, found {found}")]
    KindMismatch { expected: Kind, found: Kind },

    #[error("kind {0} has no typed schema")]
    UnsupportedKind(Kind),

    #[error("unsupported apiVersion {0}")]
    UnsupportedApiVersion(String),

    #[error("{0}")]
    Schema(serde_yaml::Error),
}
