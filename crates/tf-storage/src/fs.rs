//! Filesystem-backed object store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<bucket>/objects/<key>        object bytes
//! <root>/<bucket>/meta/<key>.json      {"content_type": ..., "size": ...}
//! ```
//!
//! Writes land in a temporary sibling file and are renamed into place, so a
//! reader never observes a partially written object.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tf_core::{media, ByteRange, Error, Result};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;

use crate::store::{validate_location, ByteStream, ObjectStore, StoredObject};

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMeta {
    content_type: String,
    size: u64,
}

/// [`ObjectStore`] that keeps each bucket in a directory under `root`.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join("objects").join(key)
    }

    fn meta_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root
            .join(bucket)
            .join("meta")
            .join(format!("{key}.json"))
    }

    async fn read_meta(&self, bucket: &str, key: &str) -> Option<ObjectMeta> {
        let raw = tokio::fs::read(self.meta_path(bucket, key)).await.ok()?;
        serde_json::from_slice(&raw).ok()
    }
}

/// Drain `stream` into `path` via a temp file in the same directory.
async fn write_atomic(path: &Path, mut stream: ByteStream) -> Result<u64> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Internal(format!("object path has no parent: {}", path.display())))?;
    tokio::fs::create_dir_all(parent).await?;

    let tmp = parent.join(format!(".part-{}", uuid::Uuid::new_v4()));
    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        Ok::<_, Error>(written)
    }
    .await;

    match result {
        Ok(written) => {
            tokio::fs::rename(&tmp, path).await?;
            Ok(written)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> Result<()> {
        validate_location(bucket, key)?;
        let path = self.object_path(bucket, key);

        let written = write_atomic(&path, stream).await?;
        if written != size {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(Error::storage(format!(
                "size mismatch for {bucket}/{key}: declared {size}, received {written}"
            )));
        }

        let meta = serde_json::to_vec(&ObjectMeta {
            content_type: content_type.to_string(),
            size: written,
        })
        .map_err(|e| Error::Internal(e.to_string()))?;
        let meta_stream: ByteStream =
            Box::pin(futures::stream::once(async move { Ok(bytes::Bytes::from(meta)) }));
        write_atomic(&self.meta_path(bucket, key), meta_stream).await?;

        tracing::debug!(bucket, key, size = written, content_type, "stored object");
        Ok(())
    }

    async fn get(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<StoredObject> {
        validate_location(bucket, key)?;
        let path = self.object_path(bucket, key);

        let mut file = match tokio::fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::object_not_found(bucket, key));
            }
            Err(e) => return Err(e.into()),
        };
        let total_size = file.metadata().await?.len();

        let content_type = match self.read_meta(bucket, key).await {
            Some(meta) => meta.content_type,
            None => media::content_type_for(key).to_string(),
        };

        let Some(range) = range else {
            return Ok(StoredObject {
                stream: Box::pin(ReaderStream::new(file)),
                content_type,
                size: total_size,
                total_size,
                range: None,
            });
        };

        let resolved = range.resolve(total_size)?;
        file.seek(SeekFrom::Start(resolved.start)).await?;
        let reader = file.take(resolved.len());

        Ok(StoredObject {
            stream: Box::pin(ReaderStream::new(reader)),
            content_type,
            size: resolved.len(),
            total_size,
            range: Some(resolved),
        })
    }
}
