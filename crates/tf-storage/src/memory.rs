//! In-memory object store.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use futures::StreamExt;
use tf_core::{ByteRange, Error, Result};

use crate::store::{validate_location, ByteStream, ObjectStore, StoredObject};

#[derive(Debug, Clone)]
struct Entry {
    data: Bytes,
    content_type: String,
}

/// [`ObjectStore`] holding every object in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<(String, String), Entry>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body of a stored object, if present.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|e| e.data.clone())
    }

    /// Content type of a stored object, if present.
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|e| e.content_type.clone())
    }

    /// All keys in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|e| e.key().0 == bucket)
            .map(|e| e.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        mut stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> Result<()> {
        validate_location(bucket, key)?;

        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        if buf.len() as u64 != size {
            return Err(Error::storage(format!(
                "size mismatch for {bucket}/{key}: declared {size}, received {}",
                buf.len()
            )));
        }

        self.objects.insert(
            (bucket.to_string(), key.to_string()),
            Entry {
                data: buf.freeze(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(
        &self,
        bucket: &str,
        key: &str,
        range: Option<ByteRange>,
    ) -> Result<StoredObject> {
        validate_location(bucket, key)?;

        let entry = self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::object_not_found(bucket, key))?;

        let total_size = entry.data.len() as u64;
        let (data, resolved) = match range {
            Some(range) => {
                let r = range.resolve(total_size)?;
                (entry.data.slice(r.start as usize..=r.end as usize), Some(r))
            }
            None => (entry.data, None),
        };

        let size = data.len() as u64;
        Ok(StoredObject {
            stream: Box::pin(futures::stream::once(async move { Ok(data) })),
            content_type: entry.content_type,
            size,
            total_size,
            range: resolved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    fn body(data: &'static [u8]) -> ByteStream {
        Box::pin(futures::stream::once(async move { Ok(Bytes::from_static(data)) }))
    }

    #[tokio::test]
    async fn put_get_and_inspect() {
        let store = MemoryObjectStore::new();
        store
            .put("hls", "p/index.m3u8", body(b"#EXTM3U"), 7, "application/vnd.apple.mpegurl")
            .await
            .unwrap();
        store.put("hls", "p/seg_00000.aac", body(b"aac"), 3, "audio/aac").await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.keys("hls"), vec!["p/index.m3u8", "p/seg_00000.aac"]);
        assert_eq!(store.object("hls", "p/index.m3u8").unwrap(), Bytes::from_static(b"#EXTM3U"));
        assert_eq!(store.content_type("hls", "p/seg_00000.aac").unwrap(), "audio/aac");

        let obj = store.get("hls", "p/index.m3u8", None).await.unwrap();
        let chunks: Vec<Bytes> = obj.stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"#EXTM3U");
    }

    #[tokio::test]
    async fn ranged_get() {
        let store = MemoryObjectStore::new();
        store.put("b", "k", body(b"0123456789"), 10, "audio/aac").await.unwrap();

        let obj = store
            .get("b", "k", Some(ByteRange::new(2, Some(4)).unwrap()))
            .await
            .unwrap();
        assert_eq!(obj.size, 3);
        assert_eq!(obj.total_size, 10);
        let chunks: Vec<Bytes> = obj.stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), b"234");

        let err = store
            .get("b", "k", Some(ByteRange::from_start(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RangeNotSatisfiable { .. }));
    }

    #[tokio::test]
    async fn missing_and_mismatched() {
        let store = MemoryObjectStore::new();
        let err = store.get("b", "missing", None).await.unwrap_err();
        assert!(matches!(err, Error::ObjectNotFound { .. }));

        let err = store.put("b", "k", body(b"abc"), 4, "x/y").await.unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
        assert!(store.is_empty());
    }
}
