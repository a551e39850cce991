//! Static file server for cross-origin isolated pages.
//!
//! Serves the working directory over HTTP/1.1 and stamps every response with
//! `Cache-Control: max-age=0, no-cache` plus the COOP/COEP pair browsers
//! require before enabling `SharedArrayBuffer`.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
