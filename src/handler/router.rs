//! Request routing dispatch module
//!
//! Method validation, path resolution and dispatch to file, index document,
//! directory listing or redirect.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::{listing, path, static_files};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, RANGE};
use hyper::{Method, Request, Response};
use tokio::fs;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw request path, still percent-encoded
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_range: Option<String>,
    pub range_header: Option<String>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let headers = req.headers();
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: *req.method() == Method::HEAD,
            if_none_match: header_string(headers, &IF_NONE_MATCH),
            if_modified_since: header_string(headers, &IF_MODIFIED_SINCE),
            if_range: header_string(headers, &IF_RANGE),
            range_header: header_string(headers, &RANGE),
        }
    }
}

impl RequestContext<'_> {
    /// Path plus query string, as sent
    pub fn target(&self) -> String {
        match self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.to_string(),
        }
    }
}

fn header_string(headers: &HeaderMap, name: &hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Produce the response for one request
///
/// Never fails: every `ServeError` becomes an error page.
pub async fn handle_request<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let is_head = *req.method() == Method::HEAD;

    if let Err(err) = check_http_method(req.method()) {
        logger::log_warning(&format!("Method not allowed: {}", req.method()));
        return http::build_error_response(&err, is_head);
    }

    let ctx = RequestContext::from_request(req);
    match route_request(&ctx, state).await {
        Ok(response) => response,
        Err(err) => {
            if let ServeError::Io(ref e) = err {
                logger::log_error(&format!("Failed to read '{}': {e}", ctx.path));
            }
            http::build_error_response(&err, is_head)
        }
    }
}

/// Only GET and HEAD are served
fn check_http_method(method: &Method) -> Result<(), ServeError> {
    match *method {
        Method::GET | Method::HEAD => Ok(()),
        _ => Err(ServeError::UnsupportedMethod(method.clone())),
    }
}

/// Resolve the path and dispatch on what it names
async fn route_request(
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let resolved = path::translate(&state.root, ctx.path);
    let metadata = fs::metadata(&resolved.fs_path)
        .await
        .map_err(ServeError::from_io)?;

    if metadata.is_dir() {
        if !resolved.trailing_slash {
            return Ok(http::build_redirect_response(&directory_location(ctx)));
        }
        if let Some(index) = static_files::find_index_file(&resolved.fs_path, &state.index_files).await {
            return static_files::serve_file(ctx, &index).await;
        }
        let html = listing::list_directory(&resolved.fs_path, &ctx.target()).await?;
        return Ok(http::build_html_response(html, ctx.is_head));
    }

    // "/file.txt/" does not name a directory
    if resolved.trailing_slash {
        return Err(ServeError::NotFound);
    }

    static_files::serve_file(ctx, &resolved.fs_path).await
}

/// Same URL with a trailing slash, query string preserved
///
/// Leading slashes collapse to one: `//host/dir` must not become a
/// protocol-relative `Location` pointing at another host.
fn directory_location(ctx: &RequestContext<'_>) -> String {
    let path = ctx.path.trim_start_matches('/');
    match ctx.query {
        Some(query) => format!("/{path}/?{query}"),
        None => format!("/{path}/"),
    }
}
