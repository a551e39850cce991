//! Directory listing page
//!
//! Generated when a directory without an index document is requested.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::Path;
use tokio::fs;

use crate::error::ServeError;
use crate::http::response::escape_html;

/// Characters left as-is in listing links: unreserved characters and `/`
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Text shown to the user: `name/` for directories, `name@` for symlinks
    pub display: String,
    /// Relative link target, `name/` for directories
    pub link: String,
}

impl ListingEntry {
    pub fn new(name: &str, is_dir: bool, is_symlink: bool) -> Self {
        let mut display = name.to_string();
        let mut link = name.to_string();
        if is_dir {
            display.push('/');
            link.push('/');
        }
        if is_symlink {
            display = format!("{name}@");
        }
        Self { display, link }
    }
}

/// Read a directory and render its listing page
///
/// `request_target` is the raw (still percent-encoded) path and query of the
/// request and is only used for the page title.
pub async fn list_directory(dir: &Path, request_target: &str) -> Result<String, ServeError> {
    let mut reader = fs::read_dir(dir).await.map_err(ServeError::from_io)?;

    let mut names = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(ServeError::from_io)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|file_type| file_type.is_symlink());
        // Follows symlinks, so a link to a directory is listed as one
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|meta| meta.is_dir());
        names.push((name, is_dir, is_symlink));
    }
    names.sort_by_key(|(name, _, _)| name.to_lowercase());

    let entries: Vec<ListingEntry> = names
        .iter()
        .map(|(name, is_dir, is_symlink)| ListingEntry::new(name, *is_dir, *is_symlink))
        .collect();

    let display_path = percent_decode_str(request_target).decode_utf8_lossy();
    Ok(render_listing(&display_path, &entries))
}

/// Render the listing HTML for already-classified entries
pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            utf8_percent_encode(&entry.link, LINK_ENCODE_SET),
            escape_html(&entry.display),
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kinds() {
        assert_eq!(
            ListingEntry::new("a.txt", false, false),
            ListingEntry {
                display: "a.txt".to_string(),
                link: "a.txt".to_string()
            }
        );
        let dir = ListingEntry::new("sub", true, false);
        assert_eq!((dir.display.as_str(), dir.link.as_str()), ("sub/", "sub/"));
        let link = ListingEntry::new("shortcut", true, true);
        assert_eq!((link.display.as_str(), link.link.as_str()), ("shortcut@", "shortcut/"));
    }

    #[test]
    fn test_render_escapes_and_encodes() {
        let entries = vec![ListingEntry::new("a b&<c>.txt", false, false)];
        let html = render_listing("/x <y>/", &entries);
        assert!(html.contains("<title>Directory listing for /x &lt;y&gt;/</title>"));
        assert!(html.contains(r#"<a href="a%20b%26%3Cc%3E.txt">a b&amp;&lt;c&gt;.txt</a>"#));
    }

    #[tokio::test]
    async fn test_list_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("A.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let html = list_directory(dir.path(), "/files/").await.unwrap();
        let a = html.find(">A.txt<").unwrap();
        let b = html.find(">b.txt<").unwrap();
        let sub = html.find(r#"<a href="sub/">sub/</a>"#).unwrap();
        assert!(a < b && b < sub);
        assert!(html.contains("<h1>Directory listing for /files/</h1>"));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_directory(&dir.path().join("nope"), "/nope/").await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound));
    }
}
