//! HTTP/1.x wire format
//!
//! Request heads are parsed with `httparse`. Responses are serialized here
//! rather than by a connection driver, so a head that fails to parse is
//! answered with the same finalized headers as any other response.

use chrono::Utc;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue, CONNECTION, CONTENT_LENGTH, DATE, TRANSFER_ENCODING};
use hyper::{Request, Response, StatusCode, Version};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::cache::format_http_date;

/// Largest request head accepted before answering 400
pub const MAX_HEAD_SIZE: usize = 64 * 1024;

const MAX_HEADERS: usize = 100;
const READ_CHUNK: usize = 8 * 1024;

/// Result of reading the next request head from a connection
#[derive(Debug)]
pub enum ReadOutcome {
    Request(Request<()>),
    /// Peer closed the connection between requests
    Closed,
    /// Bytes that are not an HTTP/1.x request head
    Malformed(String),
}

/// How the body following a request head is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Length(usize),
    /// Chunked or an unusable `Content-Length`; the connection cannot be reused
    Unframed,
}

/// Read until `buf` holds a complete request head, then consume it
///
/// Bytes after the head (a body or pipelined requests) stay in `buf`.
pub async fn read_request<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<ReadOutcome>
where
    R: AsyncRead + Unpin,
{
    loop {
        if !buf.is_empty() {
            match parse_head(buf) {
                Ok(Some((request, head_len))) => {
                    buf.drain(..head_len);
                    return Ok(ReadOutcome::Request(request));
                }
                Ok(None) if buf.len() > MAX_HEAD_SIZE => {
                    return Ok(ReadOutcome::Malformed("request head too large".to_string()));
                }
                Ok(None) => {}
                Err(reason) => return Ok(ReadOutcome::Malformed(reason)),
            }
        }

        buf.reserve(READ_CHUNK);
        if reader.read_buf(buf).await? == 0 {
            return Ok(if buf.iter().all(u8::is_ascii_whitespace) {
                ReadOutcome::Closed
            } else {
                ReadOutcome::Malformed("incomplete request".to_string())
            });
        }
    }
}

/// `Ok(None)` while the head is still incomplete
fn parse_head(buf: &[u8]) -> Result<Option<(Request<()>, usize)>, String> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut head = httparse::Request::new(&mut headers);
    let head_len = match head.parse(buf) {
        Ok(httparse::Status::Complete(len)) => len,
        Ok(httparse::Status::Partial) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let version = if head.version == Some(0) {
        Version::HTTP_10
    } else {
        Version::HTTP_11
    };
    let mut builder = Request::builder()
        .method(head.method.unwrap_or_default())
        .uri(head.path.unwrap_or_default())
        .version(version);
    for header in &*head.headers {
        builder = builder.header(header.name, header.value);
    }

    builder
        .body(())
        .map(|request| Some((request, head_len)))
        .map_err(|e| e.to_string())
}

/// Whether the client asked for the connection to stay open
pub fn wants_keep_alive<B>(req: &Request<B>) -> bool {
    let has_token = |token: &str| {
        req.headers()
            .get_all(CONNECTION)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|t| t.trim().eq_ignore_ascii_case(token))
    };

    if req.version() == Version::HTTP_10 {
        has_token("keep-alive")
    } else {
        !has_token("close")
    }
}

pub fn request_body<B>(req: &Request<B>) -> RequestBody {
    if req.headers().contains_key(TRANSFER_ENCODING) {
        return RequestBody::Unframed;
    }
    match req.headers().get(CONTENT_LENGTH) {
        None => RequestBody::Empty,
        Some(value) => match value.to_str().ok().and_then(|v| v.trim().parse().ok()) {
            Some(0) => RequestBody::Empty,
            Some(len) => RequestBody::Length(len),
            None => RequestBody::Unframed,
        },
    }
}

/// Skip `len` body bytes, starting with whatever is already buffered
pub async fn discard_body<R>(reader: &mut R, buf: &mut Vec<u8>, len: usize) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut remaining = len;
    loop {
        let take = remaining.min(buf.len());
        buf.drain(..take);
        remaining -= take;
        if remaining == 0 {
            return Ok(());
        }

        buf.reserve(READ_CHUNK);
        if reader.read_buf(buf).await? == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
    }
}

/// Serialize a finished response
///
/// Returns the bytes to write and whether the connection stays open
/// afterwards. A `Connection: close` set by the handler always wins.
pub async fn encode_response(
    response: Response<Full<Bytes>>,
    keep_alive: bool,
    request_version: Version,
) -> (Vec<u8>, bool) {
    let (mut parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_or_else(|never| match never {}, http_body_util::Collected::to_bytes);

    let keep_alive = keep_alive && !closes_connection(&parts.headers);
    if !keep_alive {
        parts.headers.insert(CONNECTION, HeaderValue::from_static("close"));
    } else if request_version == Version::HTTP_10 {
        parts.headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    }

    if let Ok(date) = HeaderValue::from_str(&format_http_date(&Utc::now())) {
        parts.headers.entry(DATE).or_insert(date);
    }
    let bodiless = parts.status == StatusCode::NOT_MODIFIED
        || parts.status == StatusCode::NO_CONTENT
        || parts.status.is_informational();
    if !bodiless {
        parts.headers.entry(CONTENT_LENGTH).or_insert_with(|| HeaderValue::from(body.len()));
    }

    let mut out = Vec::with_capacity(256 + body.len());
    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            parts.status.as_u16(),
            parts.status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );
    for (name, value) in &parts.headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    if !bodiless {
        out.extend_from_slice(&body);
    }

    (out, keep_alive)
}

fn closes_connection(headers: &HeaderMap) -> bool {
    headers
        .get(CONNECTION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("close"))
}
