//! Strict container image reference grammar.
//!
//! A reference is either `registry/repository:tag` or
//! `registry/repository[:tag]@sha256:<hex>`. Strict parsing refuses every
//! implicit default: the registry must be spelled out and a bare repository
//! never falls back to the `latest` tag.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

const TAG_DELIMITER: char = ':';
const DIGEST_DELIMITER: char = '@';
const REGISTRY_DELIMITER: char = '/';

const TAG_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-.";
const REPOSITORY_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789_-./";

const DOCKER_HUB: &str = "docker.io";
const DOCKER_HUB_INDEX: &str = "index.docker.io";
const SHA256_PREFIX: &str = "sha256:";

// host[:port] as accepted for a URI authority without userinfo
static REGISTRY_AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[[0-9A-Fa-f:.]+\]|[A-Za-z0-9\-._~!$&'()*+,;=%]*)(?::[0-9]*)?$")
        .expect("registry authority pattern is valid")
});

static SHA256_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{64}$").expect("sha256 pattern is valid"));

/// Why a single component of a reference was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("a repository name must be specified")]
    EmptyRepository,

    #[error("{element} must be between {min} and {max} characters in length: {value}")]
    Length {
        element: &'static str,
        min: usize,
        max: usize,
        value: String,
    },

    #[error("{element} can only contain the characters `{allowed}`: {value}")]
    Characters {
        element: &'static str,
        allowed: &'static str,
        value: String,
    },

    #[error("strict validation requires the registry to be explicitly defined")]
    MissingRegistry,

    #[error("registries must be valid RFC 3986 URI authorities: {0}")]
    Registry(String),

    #[error("strict validation requires the full repository path (missing 'library')")]
    ImplicitNamespace,

    #[error("a digest must contain exactly one '@' separator (e.g. registry/repository@digest) saw: {0}")]
    DigestSeparator(String),

    #[error("unsupported digest algorithm: {0}")]
    DigestAlgorithm(String),

    #[error("invalid checksum digest format: {0}")]
    DigestFormat(String),
}

/// A reference that is neither a valid tag nor a valid digest reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not parse reference: {reference}")]
pub struct ReferenceError {
    pub reference: String,
    #[source]
    pub reason: NameError,
}

/// A parsed image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    registry: String,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl Reference {
    /// Parse `input` rejecting implicit registries and implicit tags.
    pub fn parse_strict(input: &str) -> Result<Self, ReferenceError> {
        let tag_error = match parse_tag(input) {
            Ok(reference) => return Ok(reference),
            Err(err) => err,
        };
        let digest_error = match parse_digest(input) {
            Ok(reference) => return Ok(reference),
            Err(err) => err,
        };

        let reason = if input.contains(DIGEST_DELIMITER) {
            digest_error
        } else {
            tag_error
        };
        Err(ReferenceError {
            reference: input.to_string(),
            reason,
        })
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// `registry/repository` without tag or digest.
    pub fn name(&self) -> String {
        format!("{}{}{}", self.registry, REGISTRY_DELIMITER, self.repository)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if let Some(tag) = &self.tag {
            write!(f, "{}{}", TAG_DELIMITER, tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "{}{}", DIGEST_DELIMITER, digest)?;
        }
        Ok(())
    }
}

fn parse_tag(input: &str) -> Result<Reference, NameError> {
    let mut base = input;
    let mut tag = "";
    // A trailing segment with a slash is a registry port, not a tag.
    if let Some((head, last)) = input.rsplit_once(TAG_DELIMITER) {
        if !last.contains(REGISTRY_DELIMITER) {
            base = head;
            tag = last;
        }
    }

    check_element("tag", tag, TAG_CHARS, 1, 128)?;
    let (registry, repository) = parse_repository(base)?;

    Ok(Reference {
        registry,
        repository,
        tag: Some(tag.to_string()),
        digest: None,
    })
}

fn parse_digest(input: &str) -> Result<Reference, NameError> {
    let parts: Vec<&str> = input.split(DIGEST_DELIMITER).collect();
    let [base, digest] = parts.as_slice() else {
        return Err(NameError::DigestSeparator(input.to_string()));
    };

    let Some(hex) = digest.strip_prefix(SHA256_PREFIX) else {
        return Err(NameError::DigestAlgorithm(digest.to_string()));
    };
    if !SHA256_HEX.is_match(hex) {
        return Err(NameError::DigestFormat(digest.to_string()));
    }

    let (registry, repository, tag) = match parse_tag(base) {
        Ok(tagged) => (tagged.registry, tagged.repository, tagged.tag),
        Err(_) => {
            let (registry, repository) = parse_repository(base)?;
            (registry, repository, None)
        }
    };

    Ok(Reference {
        registry,
        repository,
        tag,
        digest: Some(digest.to_string()),
    })
}

fn parse_repository(name: &str) -> Result<(String, String), NameError> {
    if name.is_empty() {
        return Err(NameError::EmptyRepository);
    }

    let mut registry = "";
    let mut repository = name;
    // The first segment is a registry only if it looks like a host.
    if let Some((head, rest)) = name.split_once(REGISTRY_DELIMITER) {
        if head.contains('.') || head.contains(':') {
            registry = head;
            repository = rest;
        }
    }

    check_element("repository", repository, REPOSITORY_CHARS, 2, 255)?;
    let registry = parse_registry(registry)?;

    if registry == DOCKER_HUB_INDEX && !repository.contains(REGISTRY_DELIMITER) {
        return Err(NameError::ImplicitNamespace);
    }

    Ok((registry, repository.to_string()))
}

fn parse_registry(name: &str) -> Result<String, NameError> {
    if name.is_empty() {
        return Err(NameError::MissingRegistry);
    }
    if !REGISTRY_AUTHORITY.is_match(name) {
        return Err(NameError::Registry(name.to_string()));
    }
    if name == DOCKER_HUB {
        return Ok(DOCKER_HUB_INDEX.to_string());
    }
    Ok(name.to_string())
}

fn check_element(
    element: &'static str,
    value: &str,
    allowed: &'static str,
    min: usize,
    max: usize,
) -> Result<(), NameError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(NameError::Length {
            element,
            min,
            max,
            value: value.to_string(),
        });
    }
    if value.chars().any(|c| !allowed.contains(c)) {
        return Err(NameError::Characters {
            element,
            allowed,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str =
        "sha256:deadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33fdeadb33f";

    #[test]
    fn test_tagged_reference() {
        let reference = Reference::parse_strict("abc.io/ubuntu:1.0").unwrap();
        assert_eq!(reference.registry(), "abc.io");
        assert_eq!(reference.repository(), "ubuntu");
        assert_eq!(reference.tag(), Some("1.0"));
        assert_eq!(reference.digest(), None);
        assert_eq!(reference.to_string(), "abc.io/ubuntu:1.0");
    }

    #[test]
    fn test_registry_with_port() {
        let reference = Reference::parse_strict("localhost:5000/team/tool:v2").unwrap();
        assert_eq!(reference.registry(), "localhost:5000");
        assert_eq!(reference.repository(), "team/tool");
        assert_eq!(reference.tag(), Some("v2"));
    }

    #[test]
    fn test_tag_and_digest() {
        let input = format!("abc.io/fedora:1.0@{}", DIGEST);
        let reference = Reference::parse_strict(&input).unwrap();
        assert_eq!(reference.tag(), Some("1.0"));
        assert_eq!(reference.digest(), Some(DIGEST));
        assert_eq!(reference.to_string(), input);
    }

    #[test]
    fn test_digest_only() {
        let input = format!("gcr.io/project/image@{}", DIGEST);
        let reference = Reference::parse_strict(&input).unwrap();
        assert_eq!(reference.tag(), None);
        assert_eq!(reference.name(), "gcr.io/project/image");
    }

    #[test]
    fn test_docker_hub_is_canonicalized() {
        let reference = Reference::parse_strict("docker.io/library/ubuntu:22.04").unwrap();
        assert_eq!(reference.to_string(), "index.docker.io/library/ubuntu:22.04");
    }

    #[test]
    fn test_docker_hub_requires_namespace() {
        let err = Reference::parse_strict("docker.io/ubuntu:22.04").unwrap_err();
        assert_eq!(err.reason, NameError::ImplicitNamespace);
    }

    #[test]
    fn test_missing_registry() {
        let err = Reference::parse_strict("library/ubuntu:22.04").unwrap_err();
        assert_eq!(err.to_string(), "could not parse reference: library/ubuntu:22.04");
        assert_eq!(err.reason, NameError::MissingRegistry);
    }

    #[test]
    fn test_missing_tag() {
        let err = Reference::parse_strict("ubuntu").unwrap_err();
        assert_eq!(err.to_string(), "could not parse reference: ubuntu");
        assert!(matches!(err.reason, NameError::Length { element: "tag", .. }));

        assert!(Reference::parse_strict("abc.io/ubuntu").is_err());
    }

    #[test]
    fn test_short_digest() {
        let input = "abc.io/fedora:1.0@sha256:deadb33fdeadb33fdeadb33f";
        let err = Reference::parse_strict(input).unwrap_err();
        assert_eq!(err.to_string(), format!("could not parse reference: {}", input));
        assert!(matches!(err.reason, NameError::DigestFormat(_)));
    }

    #[test]
    fn test_unsupported_digest_algorithm() {
        let err = Reference::parse_strict("abc.io/fedora@md5:abcd").unwrap_err();
        assert!(matches!(err.reason, NameError::DigestAlgorithm(_)));
    }

    #[test]
    fn test_uppercase_repository() {
        let err = Reference::parse_strict("abc.io/Ubuntu:1.0").unwrap_err();
        assert!(matches!(
            err.reason,
            NameError::Characters { element: "repository", .. }
        ));
    }

    #[test]
    fn test_invalid_tag_characters() {
        assert!(Reference::parse_strict("abc.io/ubuntu:1.0+build").is_err());
    }

    #[test]
    fn test_registry_with_userinfo() {
        let err = Reference::parse_strict("user@abc.io/ubuntu:1.0").unwrap_err();
        assert_eq!(err.reference, "user@abc.io/ubuntu:1.0");
    }

    #[test]
    fn test_empty_reference() {
        let err = Reference::parse_strict("").unwrap_err();
        assert_eq!(err.to_string(), "could not parse reference: ");
    }
}
