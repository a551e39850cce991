//! Server module
//!
//! Socket setup, the accept loop, the HTTP/1.x request cycle on each
//! connection and signal handling.

pub mod codec;
pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module gets another name
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::Server;
pub use signal::shutdown_signal;
