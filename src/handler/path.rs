//! Request path translation
//!
//! Maps the path of a request target onto the served directory. Resolution is
//! purely lexical: `..` can remove segments taken from the request but never
//! the root itself, so no request can name a file outside it.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// A request path resolved against the served root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Location on disk
    pub fs_path: PathBuf,
    /// Whether the request path ended with `/`
    pub trailing_slash: bool,
}

/// Translate a request path (without query string) into a filesystem path
///
/// # Examples
/// ```
/// use std::path::Path;
/// use coi_server::handler::path::translate;
///
/// let resolved = translate(Path::new("/srv"), "/docs/../a%20b.txt");
/// assert_eq!(resolved.fs_path, Path::new("/srv/a b.txt"));
/// assert!(!resolved.trailing_slash);
/// ```
pub fn translate(root: &Path, request_path: &str) -> ResolvedPath {
    // Anything after '?' or '#' is not part of the path
    let raw = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let trailing_slash = decoded.trim_end().ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s if !is_plain_segment(s) => {}
            s => segments.push(s),
        }
    }

    let mut fs_path = root.to_path_buf();
    fs_path.extend(segments);

    ResolvedPath {
        fs_path,
        trailing_slash,
    }
}

/// Segments that could change the meaning of the joined path are skipped
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains(['\\', '\0']) {
        return false;
    }
    !(cfg!(windows) && segment.contains(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> PathBuf {
        translate(Path::new("/root"), path).fs_path
    }

    #[test]
    fn test_root() {
        assert_eq!(resolve("/"), Path::new("/root"));
        assert_eq!(resolve(""), Path::new("/root"));
        assert!(translate(Path::new("/root"), "/").trailing_slash);
    }

    #[test]
    fn test_plain_file() {
        assert_eq!(resolve("/foo.txt"), Path::new("/root/foo.txt"));
        assert_eq!(resolve("/a//b/./c.js"), Path::new("/root/a/b/c.js"));
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(resolve("/foo.txt?v=2"), Path::new("/root/foo.txt"));
        assert_eq!(resolve("/foo.txt#top"), Path::new("/root/foo.txt"));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(resolve("/my%20file.txt"), Path::new("/root/my file.txt"));
        assert_eq!(resolve("/a%2Fb"), Path::new("/root/a/b"));
        assert_eq!(resolve("/caf%C3%A9"), Path::new("/root/café"));
    }

    #[test]
    fn test_traversal_stays_inside_root() {
        assert_eq!(resolve("/../etc/passwd"), Path::new("/root/etc/passwd"));
        assert_eq!(resolve("/a/../../../b"), Path::new("/root/b"));
        assert_eq!(resolve("/%2e%2e/%2e%2e/secret"), Path::new("/root/secret"));
        assert_eq!(resolve("/a/b/.."), Path::new("/root/a"));
    }

    #[test]
    fn test_suspicious_segments_skipped() {
        assert_eq!(resolve("/..\\..\\x"), Path::new("/root"));
        assert_eq!(resolve("/a%00b/c"), Path::new("/root/c"));
    }

    #[test]
    fn test_trailing_slash() {
        assert!(translate(Path::new("/root"), "/docs/").trailing_slash);
        assert!(!translate(Path::new("/root"), "/docs").trailing_slash);
        assert!(translate(Path::new("/root"), "/docs/?x=1").trailing_slash);
    }
}
