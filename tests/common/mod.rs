//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which wires a temp-dir SQLite database, a
//! filesystem object store, and a fake transcoder into a full [`AppContext`]. The
//! `with_server*` constructors start Axum on a random port for HTTP-level
//! testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tf_av::{SegmentSet, ToolRegistry, Transcoder};
use tf_core::config::Config;
use tf_core::{Error, Result};
use tf_db::{init_pool, SqliteTrackRepository};
use tf_server::context::AppContext;
use tf_server::router::build_router;
use tf_storage::{FsObjectStore, ObjectStore};

pub const PLAYLIST: &str = "#EXTM3U\n#EXT-X-VERSION:3\n#EXT-X-TARGETDURATION:4\n#EXT-X-PLAYLIST-TYPE:VOD\n#EXTINF:4.0,\nseg_00000.aac\n#EXTINF:1.6,\nseg_00001.aac\n#EXT-X-ENDLIST\n";

/// Size of the first fake segment.
pub const SEGMENT_0_LEN: usize = 1000;
/// Size of the second fake segment.
pub const SEGMENT_1_LEN: usize = 400;

/// Deterministic contents of the first segment: byte `i` is `i % 251`.
pub fn segment_0() -> Vec<u8> {
    (0..SEGMENT_0_LEN).map(|i| (i % 251) as u8).collect()
}

/// Writes a fixed playlist and two segments without running any encoder.
pub struct FakeTranscoder;

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn to_segments(&self, input: &Path, output_dir: &Path, _secs: u32) -> Result<SegmentSet> {
        if tokio::fs::metadata(input).await?.len() == 0 {
            return Err(Error::encoding_failed("fake", "empty input"));
        }
        tokio::fs::write(output_dir.join("seg_00000.aac"), segment_0()).await?;
        tokio::fs::write(output_dir.join("seg_00001.aac"), vec![7u8; SEGMENT_1_LEN]).await?;
        tokio::fs::write(output_dir.join("index.m3u8"), PLAYLIST).await?;
        SegmentSet::scan("fake", output_dir)
    }
}

/// Fails as if ffmpeg were not installed.
pub struct MissingEncoder;

#[async_trait]
impl Transcoder for MissingEncoder {
    async fn to_segments(&self, _input: &Path, _output_dir: &Path, _secs: u32) -> Result<SegmentSet> {
        Err(Error::encoder_unavailable("ffmpeg", "not found in PATH"))
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    pub repo: Arc<SqliteTrackRepository>,
    /// Keeps a filesystem store's root alive for the harness lifetime.
    pub _root: tempfile::TempDir,
}

impl TestHarness {
    /// Default configuration, everything under one temp dir, fake encoder.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, Arc::new(FakeTranscoder))
    }

    pub fn with_transcoder(transcoder: Arc<dyn Transcoder>) -> Self {
        Self::build(Config::default(), transcoder)
    }

    fn build(mut config: Config, transcoder: Arc<dyn Transcoder>) -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        config.storage.root = root.path().join("objects");
        config.transcode.staging_dir = Some(root.path().join("staging"));
        config.server.db_path = root.path().join("trackforged.db");

        // File-backed so concurrent uploads get WAL rather than shared-cache locking.
        let pool = init_pool(&config.server.db_path.to_string_lossy()).expect("failed to open db");
        let repo = Arc::new(SqliteTrackRepository::new(pool));
        let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&config.storage.root));

        let ctx = AppContext::new(
            config,
            repo.clone(),
            store,
            transcoder,
            Arc::new(ToolRegistry::default()),
        );

        Self {
            ctx,
            repo,
            _root: root,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        Self::with_config(config).serve().await
    }

    pub async fn serve(self) -> (Self, SocketAddr) {
        let app = build_router(self.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Entries left behind in the staging directory.
    pub fn leftover_staging(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self._root.path().join("staging")) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }
}

/// Build a multipart upload form.
pub fn upload_form(title: Option<&str>, file_name: &str, content: Vec<u8>) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(content).file_name(file_name.to_string());
    let form = reqwest::multipart::Form::new();
    let form = match title {
        Some(title) => form.text("title", title.to_string()),
        None => form,
    };
    form.part("file", part)
}

/// POST an upload and return the response.
pub async fn upload(
    addr: SocketAddr,
    title: Option<&str>,
    file_name: &str,
    content: Vec<u8>,
) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("http://{addr}/tracks"))
        .multipart(upload_form(title, file_name, content))
        .send()
        .await
        .expect("upload request failed")
}

/// Upload a small file and return the new track id.
pub async fn upload_ok(addr: SocketAddr, title: &str) -> i64 {
    let resp = upload(addr, Some(title), "song.mp3", vec![0xFFu8; 2048]).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["id"].as_i64().expect("numeric id")
}
