//! HTTP response building module
//!
//! Builders for every status the file server produces. The fixed headers are
//! not added here; they are applied to the finished response by the
//! connection service.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, CONNECTION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
    LOCATION,
};
use hyper::{Response, StatusCode};

use crate::error::ServeError;

/// Content type of generated HTML pages
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Content type of error pages
const ERROR_CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// Validators and type information shared by 200, 206 and 304 responses
#[derive(Debug, Clone)]
pub struct FileMeta<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    /// Already formatted as an HTTP-date
    pub last_modified: &'a str,
}

/// Build 200 OK response for a whole file
pub fn build_file_response(data: Bytes, meta: &FileMeta<'_>, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, meta.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(LAST_MODIFIED, meta.last_modified)
        .header(ETAG, meta.etag)
        .header(ACCEPT_RANGES, "bytes")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    data: Bytes,
    meta: &FileMeta<'_>,
    content_range: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, meta.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(CONTENT_RANGE, content_range)
        .header(LAST_MODIFIED, meta.last_modified)
        .header(ETAG, meta.etag)
        .header(ACCEPT_RANGES, "bytes")
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_304_response(meta: &FileMeta<'_>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, meta.etag)
        .header(LAST_MODIFIED, meta.last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 301 redirect adding the trailing slash to a directory URL
pub fn build_redirect_response(location: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("301", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build generated HTML response (directory listings)
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, HTML_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build an error page for a failed request
///
/// The connection is closed after an error, and HEAD requests get the
/// headers only.
pub fn build_error_response(error: &ServeError, is_head: bool) -> Response<Full<Bytes>> {
    let status = error.status();
    let page = render_error_page(status, &error.message());
    let content_length = page.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(page)
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, ERROR_CONTENT_TYPE)
        .header(CONNECTION, "close")
        .header(CONTENT_LENGTH, content_length);

    if let ServeError::RangeNotSatisfiable { size } = error {
        builder = builder.header(CONTENT_RANGE, format!("bytes */{size}"));
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status.as_str(), &e);
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = status;
        fallback
    })
}

/// Render the HTML body of an error response
fn render_error_page(status: StatusCode, message: &str) -> String {
    let code = status.as_u16();
    let reason = status.canonical_reason().unwrap_or("Error");
    format!(
        r#"<!DOCTYPE HTML>
<html lang="en">
    <head>
        <meta charset="utf-8">
        <title>Error response</title>
    </head>
    <body>
        <h1>Error response</h1>
        <p>Error code: {code}</p>
        <p>Message: {}.</p>
        <p>Error code explanation: {code} - {}.</p>
    </body>
</html>
"#,
        escape_html(message),
        explain(status).unwrap_or(reason),
    )
}

/// Longer description of a status for error pages
fn explain(status: StatusCode) -> Option<&'static str> {
    match status.as_u16() {
        400 => Some("Bad request syntax or unsupported method"),
        403 => Some("Request forbidden -- authorization will not help"),
        404 => Some("Nothing matches the given URI"),
        416 => Some("Cannot satisfy request range"),
        501 => Some("Server does not support this operation"),
        _ => None,
    }
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn meta() -> FileMeta<'static> {
        FileMeta {
            content_type: "text/plain; charset=utf-8",
            etag: "\"abc\"",
            last_modified: "Sun, 06 Nov 1994 08:49:37 GMT",
        }
    }

    #[tokio::test]
    async fn test_file_response_head_has_length_but_no_body() {
        let response = build_file_response(Bytes::from_static(b"0123456789"), &meta(), true);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "10");
        assert_eq!(response.headers()[ACCEPT_RANGES], "bytes");
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_partial_response() {
        let response =
            build_partial_response(Bytes::from_static(b"0123"), &meta(), "bytes 0-3/10", false);
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes 0-3/10");
        assert_eq!(response.headers()[CONTENT_LENGTH], "4");
        assert_eq!(body_string(response).await, "0123");
    }

    #[tokio::test]
    async fn test_error_page() {
        let response = build_error_response(&ServeError::NotFound, false);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONNECTION], "close");
        let body = body_string(response).await;
        assert!(body.contains("Error code: 404"));
        assert!(body.contains("Message: File not found."));
        assert!(body.contains("Nothing matches the given URI"));
    }

    #[tokio::test]
    async fn test_range_error_has_content_range() {
        let response = build_error_response(&ServeError::RangeNotSatisfiable { size: 10 }, true);
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */10");
        assert_eq!(body_string(response).await, "");
    }

    #[test]
    fn test_redirect() {
        let response = build_redirect_response("/docs/?q=1");
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/docs/?q=1");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }
}
