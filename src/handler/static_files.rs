//! Static file serving module
//!
//! Handles file loading, conditional requests, byte ranges and response
//! building.

use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::response::FileMeta;
use crate::http::{self, cache, mime, range::RangeParseResult};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

/// Serve a single file
pub async fn serve_file(
    ctx: &RequestContext<'_>,
    file_path: &Path,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let (content, modified) = load_file(file_path).await?;
    let content_type = mime::content_type_for(file_path);
    build_static_file_response(ctx, Bytes::from(content), content_type, modified)
}

/// Read a file and its modification time
pub async fn load_file(file_path: &Path) -> Result<(Vec<u8>, SystemTime), ServeError> {
    let metadata = fs::metadata(file_path).await.map_err(ServeError::from_io)?;
    let content = fs::read(file_path).await.map_err(ServeError::from_io)?;
    let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    Ok((content, modified))
}

/// Find the first index document that exists as a regular file in `dir`
pub async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for index_file in index_files {
        let index_path = dir.join(index_file);
        if fs::metadata(&index_path)
            .await
            .is_ok_and(|meta| meta.is_file())
        {
            return Some(index_path);
        }
    }
    None
}

/// Build static file response with `ETag`, `Last-Modified` and Range support
fn build_static_file_response(
    ctx: &RequestContext<'_>,
    data: Bytes,
    content_type: &str,
    modified: SystemTime,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let etag = cache::generate_etag(&data);
    let modified = cache::last_modified(modified);
    let last_modified = cache::format_http_date(&modified);
    let total_size = data.len();

    let meta = FileMeta {
        content_type,
        etag: &etag,
        last_modified: &last_modified,
    };

    // Check if client has cached version
    if cache::is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
        &etag,
        &modified,
    ) {
        return Ok(http::build_304_response(&meta));
    }

    // A stale If-Range validator turns a range request into a full one
    let range_header = ctx
        .range_header
        .as_deref()
        .filter(|_| cache::if_range_matches(ctx.if_range.as_deref(), &etag, &modified));

    match http::parse_range_header(range_header, total_size) {
        RangeParseResult::Valid(range) => {
            let body = data.slice(range.positions(total_size));
            Ok(http::build_partial_response(
                body,
                &meta,
                &range.content_range(total_size),
                ctx.is_head,
            ))
        }
        RangeParseResult::NotSatisfiable => {
            Err(ServeError::RangeNotSatisfiable { size: total_size })
        }
        RangeParseResult::None => Ok(http::build_file_response(data, &meta, ctx.is_head)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn context<'a>(range: Option<&str>, if_none_match: Option<&str>) -> RequestContext<'a> {
        RequestContext {
            path: "/ten.bin",
            query: None,
            is_head: false,
            if_none_match: if_none_match.map(ToString::to_string),
            if_modified_since: None,
            if_range: None,
            range_header: range.map(ToString::to_string),
        }
    }

    async fn body(response: Response<Full<Bytes>>) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&context(None, None), &path).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/octet-stream");
        assert!(response.headers().contains_key("last-modified"));
        assert_eq!(body(response).await, b"0123456789");
    }

    #[tokio::test]
    async fn test_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let response = serve_file(&context(Some("bytes=0-3"), None), &path)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()["content-range"], "bytes 0-3/10");
        assert_eq!(body(response).await, b"0123");

        let err = serve_file(&context(Some("bytes=10-"), None), &path)
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::RangeNotSatisfiable { size: 10 }));
    }

    #[tokio::test]
    async fn test_stale_if_range_serves_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut ctx = context(Some("bytes=0-3"), None);
        ctx.if_range = Some("\"stale\"".to_string());
        let response = serve_file(&ctx, &path).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await, b"0123456789");
    }

    #[tokio::test]
    async fn test_etag_revalidation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ten.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let first = serve_file(&context(None, None), &path).await.unwrap();
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let second = serve_file(&context(None, Some(&etag)), &path).await.unwrap();
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        assert!(body(second).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = serve_file(&context(None, None), &dir.path().join("nope.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::NotFound));
    }

    #[tokio::test]
    async fn test_find_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let index_files = vec!["index.html".to_string(), "index.htm".to_string()];
        assert_eq!(find_index_file(dir.path(), &index_files).await, None);

        std::fs::write(dir.path().join("index.htm"), b"<p>htm</p>").unwrap();
        assert_eq!(
            find_index_file(dir.path(), &index_files).await,
            Some(dir.path().join("index.htm"))
        );

        std::fs::write(dir.path().join("index.html"), b"<p>html</p>").unwrap();
        assert_eq!(
            find_index_file(dir.path(), &index_files).await,
            Some(dir.path().join("index.html"))
        );
    }
}
