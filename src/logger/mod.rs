//! Logger module
//!
//! Lifecycle messages go to stdout. Errors, warnings and one access line
//! per request go to stderr.

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::path::Path;

/// Write a lifecycle message to stdout
fn write_info(message: &str) {
    println!("{message}");
}

/// Write to the error stream
fn write_error(message: &str) {
    eprintln!("{message}");
}

/// Startup banner
///
/// The first line is the one scripts wait for before sending requests.
pub fn log_server_start(addr: &SocketAddr, root: &Path) {
    write_info(&format!("serving at port {}", addr.port()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Serving directory: {}", root.display()));
}

pub fn log_shutdown(signal: &str) {
    write_info(&format!("{signal} received, shutting down"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    write_error(&format!("[ERROR] Failed to serve connection: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Request head that could not be parsed, answered with 400
pub fn log_bad_request(peer_addr: &SocketAddr, reason: &str) {
    write_error(&format!("{} - - code 400, message {reason}", peer_addr.ip()));
}

/// Log one access line
pub fn log_access(entry: &AccessLogEntry) {
    write_error(&entry.format());
}
