//! Byte ranges for partial object reads.
//!
//! [`ByteRange`] is what callers request; [`ResolvedRange`] is what a store
//! actually serves once the object size is known.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A requested byte range. Both bounds are inclusive; `end == None` means
/// "through the last byte of the resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    start: u64,
    end: Option<u64>,
}

impl ByteRange {
    /// Build a range, rejecting `end < start`.
    pub fn new(start: u64, end: Option<u64>) -> Option<Self> {
        match end {
            Some(end) if end < start => None,
            _ => Some(Self { start, end }),
        }
    }

    /// Range from `start` to the end of the resource.
    pub fn from_start(start: u64) -> Self {
        Self { start, end: None }
    }

    /// First requested byte.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last requested byte, if bounded.
    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Clamp this range against an object of `size` bytes.
    ///
    /// An end past the last byte is clamped. A start at or past the end of
    /// the object cannot be served and yields [`Error::RangeNotSatisfiable`].
    pub fn resolve(&self, size: u64) -> Result<ResolvedRange> {
        if self.start >= size {
            return Err(Error::RangeNotSatisfiable { size });
        }
        let last = size - 1;
        let end = self.end.map_or(last, |e| e.min(last));
        Ok(ResolvedRange {
            start: self.start,
            end,
            total: size,
        })
    }
}

/// A range clamped to a concrete object size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    /// First served byte.
    pub start: u64,
    /// Last served byte (inclusive).
    pub end: u64,
    /// Size of the whole object.
    pub total: u64,
}

impl ResolvedRange {
    /// Number of bytes served.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A resolved range always covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` header value, e.g. `bytes 100-199/1000`.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Parse a `Range: bytes=START-END` header value.
///
/// Only the single-range form is understood; `END` may be empty for an
/// open-ended range. Anything else (suffix ranges, multiple ranges, other
/// units, `END < START`, non-numeric bounds) yields `None`, and the caller
/// serves the full resource instead of rejecting the request.
pub fn parse_range_header(value: &str) -> Option<ByteRange> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let (start_str, end_str) = spec.split_once('-')?;

    let start: u64 = start_str.trim().parse().ok()?;
    let end_str = end_str.trim();
    let end = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse::<u64>().ok()?)
    };

    ByteRange::new(start, end)
}
