//! Collaborators for pipeline tests: an in-memory stack plus wrappers that
//! fail at chosen steps.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tf_av::{SegmentSet, Transcoder};
use tf_core::{ByteRange, Error, Result, Track, TrackId, TrackSummary};
use tf_db::{init_memory_pool, SqliteTrackRepository, TrackRepository};
use tf_storage::{ByteStream, MemoryObjectStore, ObjectStore, StoredObject};

use crate::ingest::{IngestService, IngestSettings};

pub struct Harness {
    pub repo: Arc<SqliteTrackRepository>,
    pub store: Arc<MemoryObjectStore>,
    pub transcoder: Arc<dyn Transcoder>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            repo: Arc::new(SqliteTrackRepository::new(init_memory_pool().unwrap())),
            store: Arc::new(MemoryObjectStore::new()),
            transcoder: Arc::new(FakeTranscoder),
        }
    }

    pub fn settings(&self) -> IngestSettings {
        IngestSettings::default()
    }

    pub fn service(&self) -> IngestService {
        IngestService::new(
            self.repo.clone(),
            self.store.clone(),
            self.transcoder.clone(),
            self.settings(),
        )
    }
}

/// Writes two segments and a playlist without running any encoder.
pub struct FakeTranscoder;

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn to_segments(&self, input: &Path, output_dir: &Path, _secs: u32) -> Result<SegmentSet> {
        assert!(input.exists(), "input must be staged before transcoding");
        tokio::fs::write(output_dir.join("seg_00000.aac"), vec![1u8; 1000]).await?;
        tokio::fs::write(output_dir.join("seg_00001.aac"), vec![2u8; 400]).await?;
        tokio::fs::write(
            output_dir.join("index.m3u8"),
            "#EXTM3U\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXTINF:4.0,\nseg_00000.aac\n#EXTINF:1.6,\nseg_00001.aac\n#EXT-X-ENDLIST\n",
        )
        .await?;
        SegmentSet::scan("fake", output_dir)
    }
}

pub enum Broken {
    Unavailable,
    EncodingFailed,
    Hangs,
}

pub struct BrokenTranscoder(Broken);

impl BrokenTranscoder {
    pub fn unavailable() -> Self {
        Self(Broken::Unavailable)
    }
    pub fn encoding_failed() -> Self {
        Self(Broken::EncodingFailed)
    }
    pub fn hangs() -> Self {
        Self(Broken::Hangs)
    }
}

#[async_trait]
impl Transcoder for BrokenTranscoder {
    async fn to_segments(&self, _input: &Path, output_dir: &Path, _secs: u32) -> Result<SegmentSet> {
        match self.0 {
            Broken::Unavailable => Err(Error::encoder_unavailable("ffmpeg", "not found")),
            Broken::EncodingFailed => {
                tokio::fs::write(output_dir.join("seg_00000.aac"), b"partial").await?;
                Err(Error::encoding_failed("ffmpeg", "exited with 1: Invalid data"))
            }
            Broken::Hangs => std::future::pending().await,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Create,
    SetOriginKey,
    SetHls,
}

/// Delegates to a real repository except at one step.
pub struct FailingRepo {
    inner: Arc<SqliteTrackRepository>,
    fail_at: FailAt,
}

impl FailingRepo {
    pub fn new(inner: Arc<SqliteTrackRepository>, fail_at: FailAt) -> Self {
        Self { inner, fail_at }
    }

    fn check(&self, step: FailAt) -> Result<()> {
        if self.fail_at == step {
            return Err(Error::database("disk I/O error at /var/lib/secret.db"));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackRepository for FailingRepo {
    async fn create(&self, title: &str, origin_bucket: &str) -> Result<TrackId> {
        self.check(FailAt::Create)?;
        self.inner.create(title, origin_bucket).await
    }
    async fn set_origin_key(&self, id: TrackId, key: &str) -> Result<()> {
        self.check(FailAt::SetOriginKey)?;
        self.inner.set_origin_key(id, key).await
    }
    async fn set_hls(&self, id: TrackId, bucket: &str, prefix: &str) -> Result<()> {
        self.check(FailAt::SetHls)?;
        self.inner.set_hls(id, bucket, prefix).await
    }
    async fn get(&self, id: TrackId) -> Result<Track> {
        self.inner.get(id).await
    }
    async fn list(&self, count: u32, offset: u64) -> Result<Vec<TrackSummary>> {
        self.inner.list(count, offset).await
    }
}

/// Delegates to a memory store but fails puts whose key contains `pattern`.
pub struct FailingStore {
    inner: Arc<MemoryObjectStore>,
    pattern: &'static str,
}

impl FailingStore {
    pub fn new(inner: Arc<MemoryObjectStore>, pattern: &'static str) -> Self {
        Self { inner, pattern }
    }
}

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        stream: ByteStream,
        size: u64,
        content_type: &str,
    ) -> Result<()> {
        if key.contains(self.pattern) {
            return Err(Error::storage("connection reset by peer"));
        }
        self.inner.put(bucket, key, stream, size, content_type).await
    }

    async fn get(&self, bucket: &str, key: &str, range: Option<ByteRange>) -> Result<StoredObject> {
        self.inner.get(bucket, key, range).await
    }
}
