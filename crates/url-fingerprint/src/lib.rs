//! Deterministic URL fingerprints for disk-cached downloads
//!
//! A fingerprint is the MD5 digest of the URL string rendered as 32 lowercase
//! hex characters, so the same URL always maps to the same cache file on every
//! platform. Distinct URLs collide only with negligible probability.

use md5::{Digest as _, Md5};
use tracing::warn;

/// Produces a hex digest for a URL string, or `None` when no digest can be
/// computed. The fallible signature exists so callers can observe the
/// degraded raw-URL path; [`Md5Digester`] itself never fails.
pub trait Digester {
    fn digest(&self, input: &str) -> Option<String>;
}

/// Default digester: MD5, rendered as 32 zero-padded lowercase hex chars.
pub struct Md5Digester;

impl Digester for Md5Digester {
    fn digest(&self, input: &str) -> Option<String> {
        let mut hasher = Md5::new();
        hasher.update(input.as_bytes());
        Some(hex::encode(hasher.finalize()))
    }
}

/// Fingerprint a URL with the default MD5 digester.
pub fn fingerprint(url: &str) -> String {
    fingerprint_with(&Md5Digester, url)
}

/// Fingerprint a URL with a caller-supplied digester.
///
/// When the digester yields `None`, the raw URL is returned as the
/// fingerprint. Caching then degenerates to one file per distinct URL
/// string, which is still correct, just not obfuscated.
pub fn fingerprint_with(digester: &dyn Digester, url: &str) -> String {
    match digester.digest(url) {
        Some(digest) => digest,
        None => {
            warn!(url = %url, "digest unavailable, using raw URL as fingerprint");
            url.to_string()
        }
    }
}

/// The substring from the last `.` of the URL to its end, or `""` when the
/// URL contains no dot.
///
/// This mirrors the naive extension parse the cache file name has always
/// used: a query string after the extension is kept, so
/// `.../photo.jpg?w=640` yields `.jpg?w=640`. The extension only affects
/// file naming, never decoding.
pub fn trailing_extension(url: &str) -> &str {
    match url.rfind('.') {
        Some(idx) => &url[idx..],
        None => "",
    }
}

/// Cache file name for a URL: fingerprint plus trailing extension.
pub fn cache_file_name(url: &str) -> String {
    format!("{}{}", fingerprint(url), trailing_extension(url))
}
