//! HTTP protocol layer module
//!
//! Protocol pieces used by the file handler: response builders, the fixed
//! header hook, range parsing, cache validators and MIME lookup.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use headers::FixedHeaders;
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_error_response, build_file_response, build_html_response,
    build_partial_response, build_redirect_response,
};
