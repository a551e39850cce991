//! Request handler module
//!
//! Responsible for request routing dispatch and static file serving. The
//! `serve` entry point runs the router and then finalizes the response
//! headers.

pub mod listing;
pub mod path;
pub mod router;
pub mod static_files;

use crate::config::AppState;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, SERVER};
use hyper::{Request, Response};

/// Entry point for one parsed request
///
/// The request body is never looked at: only GET and HEAD are served, and
/// any other method is answered without it.
pub async fn serve<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let response = router::handle_request(req, state).await;
    finalize_response(state, response)
}

/// Last step before a response is written to the connection
///
/// Adds the `Server` header and the fixed header set. Every response goes
/// through here, whatever its status.
pub fn finalize_response(state: &AppState, mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    if let Ok(server) = HeaderValue::from_str(&state.server_name) {
        response.headers_mut().entry(SERVER).or_insert(server);
    }
    state.fixed_headers.finalize(response)
}
