//! Request classification.
//!
//! Same-origin GET requests fall into exactly one class. The image check
//! runs before the static check, so a manifest-listed image such as
//! `/images/logo.svg` is an image request and lives in the image partition
//! once refetched.

use std::sync::LazyLock;

use hedgerow_core::{Destination, Request};
use regex::Regex;
use schemars::JsonSchema;
use serde::Serialize;

static IMAGE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|avif|svg|ico)$").expect("valid image regex"));

static ASSET_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(css|js|json|woff|woff2|ttf|eot)$").expect("valid asset regex"));

/// Which partition and strategy a same-origin GET request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    Image,
    Static,
    Dynamic,
}

/// Image destination, or an image extension on the URL path (query ignored).
pub fn is_image_request(request: &Request) -> bool {
    request.destination == Destination::Image || IMAGE_EXTENSION.is_match(request.url.path())
}

/// Asset extension on the URL path, or the path is listed in the manifest.
pub fn is_static_asset(request: &Request, manifest: &[String]) -> bool {
    let path = request.url.path();
    ASSET_EXTENSION.is_match(path) || manifest.iter().any(|p| p == path)
}

pub fn classify(request: &Request, manifest: &[String]) -> RequestClass {
    if is_image_request(request) {
        RequestClass::Image
    } else if is_static_asset(request, manifest) {
        RequestClass::Static
    } else {
        RequestClass::Dynamic
    }
}
