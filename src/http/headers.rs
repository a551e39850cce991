//! Fixed response headers
//!
//! Every response the server sends carries the same three headers: caching
//! is disabled and the page is put in a cross-origin isolated context, which
//! browsers require before exposing `SharedArrayBuffer` and shared
//! WebAssembly memory.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::Response;

/// Header name/value pairs sent on every response
pub const CROSS_ORIGIN_ISOLATION: [(&str, &str); 3] = [
    ("cache-control", "max-age=0, no-cache"),
    ("cross-origin-embedder-policy", "require-corp"),
    ("cross-origin-opener-policy", "same-origin"),
];

/// Immutable set of headers applied to outgoing responses
#[derive(Debug, Clone)]
pub struct FixedHeaders {
    headers: HeaderMap,
}

impl FixedHeaders {
    /// The no-cache + cross-origin isolation header set
    pub fn cross_origin_isolated() -> Self {
        let headers = CROSS_ORIGIN_ISOLATION
            .iter()
            .map(|&(name, value)| {
                (
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                )
            })
            .collect();
        Self { headers }
    }

    /// Add the fixed headers to a header block that is about to be sent
    ///
    /// Existing values under the same names are replaced so that each fixed
    /// header appears exactly once.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    /// Apply to a finished response, returning it
    pub fn finalize<B>(&self, mut response: Response<B>) -> Response<B> {
        self.apply(response.headers_mut());
        response
    }
}

impl Default for FixedHeaders {
    fn default() -> Self {
        Self::cross_origin_isolated()
    }
}
