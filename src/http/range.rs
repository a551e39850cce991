//! HTTP Range request parsing module
//!
//! Single byte-range parsing for partial downloads, compliant with RFC 7233.

use std::ops::RangeInclusive;

/// Parsed Range request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRequest {
    /// Start byte position
    pub start: usize,
    /// End byte position, None means until end of file
    pub end: Option<usize>,
}

impl RangeRequest {
    /// Calculate actual end position (considering file size)
    #[inline]
    pub fn end_position(&self, file_size: usize) -> usize {
        self.end.unwrap_or_else(|| file_size.saturating_sub(1))
    }

    /// Byte positions covered by this range, both ends inclusive
    pub fn positions(&self, file_size: usize) -> RangeInclusive<usize> {
        self.start..=self.end_position(file_size)
    }

    /// `Content-Range` header value, e.g. `bytes 0-99/1000`
    pub fn content_range(&self, file_size: usize) -> String {
        format!(
            "bytes {}-{}/{file_size}",
            self.start,
            self.end_position(file_size)
        )
    }
}

/// Range header parse result
#[derive(Debug)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(RangeRequest),
    /// Range not satisfiable (start >= `file_size`) - should return 416
    NotSatisfiable,
    /// No Range header or malformed (ignore, return full content)
    None,
}

/// Syntactic form of a single byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRangeSpec {
    /// `first-` or `first-last`
    FromTo(usize, Option<usize>),
    /// `-length`: the final `length` bytes
    Suffix(usize),
}

impl ByteRangeSpec {
    /// `None` for anything that is not a single well-formed byte range
    fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes=")?;
        // Multiple ranges are answered with the whole file
        if spec.contains(',') {
            return None;
        }

        let (first, last) = spec.split_once('-')?;
        let (first, last) = (first.trim(), last.trim());
        if first.is_empty() {
            return last.parse().ok().map(Self::Suffix);
        }

        let first: usize = first.parse().ok()?;
        let last = match last {
            "" => None,
            last => Some(last.parse::<usize>().ok().filter(|&l| l >= first)?),
        };
        Some(Self::FromTo(first, last))
    }

    /// Resolve against the current size of the file
    fn satisfy(self, file_size: usize) -> RangeParseResult {
        match self {
            Self::Suffix(0) => RangeParseResult::NotSatisfiable,
            Self::Suffix(_) if file_size == 0 => RangeParseResult::NotSatisfiable,
            Self::Suffix(length) => RangeParseResult::Valid(RangeRequest {
                start: file_size.saturating_sub(length),
                end: Some(file_size - 1),
            }),
            Self::FromTo(first, _) if first >= file_size => RangeParseResult::NotSatisfiable,
            Self::FromTo(first, last) => RangeParseResult::Valid(RangeRequest {
                start: first,
                end: last.map(|l| l.min(file_size - 1)),
            }),
        }
    }
}

/// Parse a `Range` header value against a file of `file_size` bytes
///
/// Accepts `bytes=first-last`, `bytes=first-` and `bytes=-length`. Other
/// units, multiple ranges and malformed values yield `None` so the whole
/// file is sent.
///
/// # Examples
/// ```
/// use coi_server::http::range::{parse_range_header, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-3"), 10);
/// assert!(matches!(result, RangeParseResult::Valid(_)));
///
/// let result = parse_range_header(Some("bytes=10-"), 10);
/// assert!(matches!(result, RangeParseResult::NotSatisfiable));
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    range_header
        .and_then(ByteRangeSpec::parse)
        .map_or(RangeParseResult::None, |spec| spec.satisfy(file_size))
}
