//! The object store capability.

use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use tf_core::{ByteRange, Error, ResolvedRange, Result};
use tokio_util::io::ReaderStream;

/// Streaming body used for both uploads and reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send>>;

/// Result of a successful [`ObjectStore::get`].
pub struct StoredObject {
    /// Object body, or the requested slice of it. Pull-based: dropping the
    /// stream abandons the read.
    pub stream: ByteStream,
    /// Content type recorded at put time.
    pub content_type: String,
    /// Number of bytes the stream yields.
    pub size: u64,
    /// Size of the whole object.
    pub total_size: u64,
    /// The range actually served, when one was requested.
    pub range: Option<ResolvedRange>,
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredObject")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .field("total_size", &self.total_size)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// Bucket/key blob storage with optional byte-range reads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `size` bytes from `stream` under `bucket`/`key`, replacing any
    /// existing object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> Result<()>;

    /// Read an object, or a slice of it when `range` is given.
    ///
    /// Missing objects fail with [`Error::ObjectNotFound`]; a range starting
    /// past the end fails with [`Error::RangeNotSatisfiable`].
    async fn get(&self, bucket: &str, key: &str, range: Option<ByteRange>)
        -> Result<StoredObject>;
}

/// Reject bucket names and keys that could escape their namespace.
///
/// Buckets are a single non-empty segment. Keys are `/`-separated relative
/// paths with no empty, `.` or `..` segments and no backslashes.
pub fn validate_location(bucket: &str, key: &str) -> Result<()> {
    if bucket.is_empty()
        || bucket.contains(['/', '\\'])
        || bucket == "."
        || bucket == ".."
    {
        return Err(Error::Validation(format!("invalid bucket name: {bucket:?}")));
    }
    let bad_key = key.is_empty()
        || key.contains('\\')
        || key
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad_key {
        return Err(Error::Validation(format!("invalid object key: {key:?}")));
    }
    Ok(())
}

/// Open a local file as a [`ByteStream`], returning it with its length.
pub async fn file_stream(path: &Path) -> Result<(ByteStream, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    Ok((Box::pin(ReaderStream::new(file)), len))
}
