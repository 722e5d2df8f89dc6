//! Step image policy.

use pipelint_core::{Check, Finding};
use tracing::debug;

use crate::reference::Reference;

const FLOATING_TAG: &str = "latest";

/// Check one step image: it must parse strictly and must not float on `latest`.
///
/// An image that fails to parse yields exactly one finding; the tag policy is
/// only applied to images that parse.
pub fn check_image(image: &str) -> Vec<Finding> {
    let reference = match Reference::parse_strict(image) {
        Ok(reference) => reference,
        Err(err) => {
            debug!(image, reason = %err.reason, "rejected image reference");
            return vec![Finding::error(
                Check::ImageReference,
                format!("Invalid Image Reference: {}", err),
            )];
        }
    };

    // Matches anywhere in the canonical form, including repository paths.
    if reference.to_string().contains(FLOATING_TAG) {
        return vec![Finding::error(
            Check::ImageTag,
            format!(
                "Task image ({}) must be tagged with a specific version",
                image
            ),
        )];
    }

    Vec::new()
}
