//! Upload ingestion: record, store, transcode, publish.
//!
//! Steps run strictly in order and every failure is terminal:
//!
//! 1. create the track row
//! 2. record its origin key
//! 3. stage the upload and store it unmodified
//! 4. transcode the staged copy
//! 5. store every output file under the track's HLS prefix
//! 6. record the HLS location
//!
//! Step 6 is the only write that makes a track streamable, so a failure at
//! any earlier point leaves a track that never resolves. Orphaned blobs from
//! a failed step 5 are unreferenced and left for a later sweep.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tf_av::{Transcoder, Workspace};
use tf_core::config::Config;
use tf_core::{media, Error, Result, TrackId};
use tf_db::TrackRepository;
use tf_storage::{file_stream, ObjectStore};
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::keys;

/// Where and how ingestion writes its output.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub origin_bucket: String,
    pub hls_bucket: String,
    /// Target HLS segment duration in seconds.
    pub segment_seconds: u32,
    /// Rendition tag used in the HLS prefix.
    pub rendition: String,
    /// Parent of per-ingest workspaces; system temp dir when `None`.
    pub staging_dir: Option<PathBuf>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for IngestSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            origin_bucket: cfg.storage.origin_bucket.clone(),
            hls_bucket: cfg.storage.hls_bucket.clone(),
            segment_seconds: cfg.transcode.segment_seconds,
            rendition: keys::DEFAULT_RENDITION.to_string(),
            staging_dir: cfg.transcode.staging_dir.clone(),
        }
    }
}

/// Outcome of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedTrack {
    pub id: TrackId,
    /// Effective title after normalization.
    pub title: String,
}

/// Orchestrates one upload through the repository, store and transcoder.
#[derive(Clone)]
pub struct IngestService {
    tracks: Arc<dyn TrackRepository>,
    store: Arc<dyn ObjectStore>,
    transcoder: Arc<dyn Transcoder>,
    settings: IngestSettings,
}

impl IngestService {
    pub fn new(
        tracks: Arc<dyn TrackRepository>,
        store: Arc<dyn ObjectStore>,
        transcoder: Arc<dyn Transcoder>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            tracks,
            store,
            transcoder,
            settings,
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Ingest `size` bytes read from `content`.
    ///
    /// Returns once the track is streamable. Temporary files are removed on
    /// every exit path, including when this future is dropped.
    pub async fn ingest<R>(
        &self,
        title: &str,
        filename: &str,
        content: R,
        size: u64,
    ) -> Result<IngestedTrack>
    where
        R: AsyncRead + Unpin + Send,
    {
        if size == 0 {
            let err = Error::Validation("uploaded file is empty".into());
            tracing::info!(op = "tracks.ingest", filename, error = %err, "rejected upload");
            return Err(err);
        }

        let title = normalize_title(title, filename);
        let extension = media::normalized_extension(filename);

        let id = self
            .tracks
            .create(&title, &self.settings.origin_bucket)
            .await
            .map_err(|e| failed(None, Error::metadata_write("create", e)))?;

        let origin_key = keys::origin_key(id, &extension);
        self.tracks
            .set_origin_key(id, &origin_key)
            .await
            .map_err(|e| failed(Some(id), Error::metadata_write("set_origin_key", e)))?;

        let workspace = Workspace::new(self.settings.staging_dir.as_deref(), &extension)
            .map_err(|e| failed(Some(id), Error::origin_upload(e)))?;

        let staged = stage(content, workspace.input())
            .await
            .map_err(|e| failed(Some(id), Error::origin_upload(e)))?;
        if staged != size {
            tracing::warn!(
                op = "tracks.ingest",
                track_id = %id,
                declared = size,
                staged,
                "upload size differs from declared size"
            );
        }

        self.put_file(&self.settings.origin_bucket, &origin_key, workspace.input())
            .await
            .map_err(|e| failed(Some(id), Error::origin_upload(e)))?;
        tracing::info!(op = "tracks.ingest", track_id = %id, key = %origin_key, size = staged, "stored original");

        let segments = self
            .transcoder
            .to_segments(
                workspace.input(),
                workspace.output_dir(),
                self.settings.segment_seconds,
            )
            .await
            .map_err(|e| failed(Some(id), Error::transcode(e)))?;

        let prefix = keys::hls_prefix(id, &self.settings.rendition);
        for path in segments.files() {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let key = format!("{prefix}{name}");
            self.put_file(&self.settings.hls_bucket, &key, path)
                .await
                .map_err(|e| failed(Some(id), Error::segment_upload(&key, e)))?;
        }

        self.tracks
            .set_hls(id, &self.settings.hls_bucket, &prefix)
            .await
            .map_err(|e| failed(Some(id), Error::metadata_write("set_hls", e)))?;

        tracing::info!(
            op = "tracks.ingest",
            track_id = %id,
            prefix = %prefix,
            files = segments.len(),
            "track ready"
        );

        Ok(IngestedTrack { id, title })
    }

    async fn put_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let (stream, len) = file_stream(path).await?;
        self.store
            .put(bucket, key, stream, len, media::content_type_for(key))
            .await
    }
}

/// Trimmed title, falling back to the file name and then to `untitled`.
pub fn normalize_title(title: &str, filename: &str) -> String {
    [title.trim(), filename.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("untitled")
        .to_string()
}

/// Copy `content` into a new file at `dest`, returning the byte count.
async fn stage<R>(mut content: R, dest: &Path) -> Result<u64>
where
    R: AsyncRead + Unpin + Send,
{
    let mut file = tokio::fs::File::create(dest).await?;
    let n = tokio::io::copy(&mut content, &mut file).await?;
    file.flush().await?;
    Ok(n)
}

fn failed(id: Option<TrackId>, err: Error) -> Error {
    let track_id = id.map(|id| id.get());
    if err.is_server_error() {
        tracing::error!(op = "tracks.ingest", track_id, code = err.code(), error = %err, "ingest failed");
    } else {
        tracing::warn!(op = "tracks.ingest", track_id, code = err.code(), error = %err, "ingest failed");
    }
    err
}
