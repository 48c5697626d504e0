//! Container image resolution

use crate::constants::{DOCKER_REPO, DOCKER_USERNAME};

/// Builds the `name:tag` reference of the Swift build image
///
/// Any tag is accepted; whether the image exists is left to the container runtime.
pub fn docker_image(tag: &str) -> String {
    format!("{}/{}:{}", DOCKER_USERNAME, DOCKER_REPO, tag)
}
