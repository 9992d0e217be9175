//! Cache key generation for stored request/response pairs.

use sha2::{Digest, Sha256};

use crate::request::Request;

/// Compute the key an entry is stored under: method and fragment-free URL.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Key for a request, normalizing the URL first.
pub fn request_key(request: &Request) -> String {
    compute_cache_key(&request.method, &request.normalized_url())
}
