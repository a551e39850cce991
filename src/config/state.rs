// Application state module
// Runtime values shared read-only by every connection

use std::path::PathBuf;

use crate::http::headers::FixedHeaders;

/// Default documents tried, in order, when a directory is requested
pub const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Application state
///
/// Built once at startup and shared behind an `Arc`. Nothing in here is
/// mutated afterwards, so request handling takes no locks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Directory requests are resolved against
    pub root: PathBuf,
    /// Headers appended to every response
    pub fixed_headers: FixedHeaders,
    /// Value of the `Server` response header
    pub server_name: String,
    pub index_files: Vec<String>,
    /// Write a common-format line to stderr per request
    pub access_log: bool,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            fixed_headers: FixedHeaders::cross_origin_isolated(),
            server_name: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            index_files: INDEX_FILES.iter().map(ToString::to_string).collect(),
            access_log: true,
        }
    }
}
