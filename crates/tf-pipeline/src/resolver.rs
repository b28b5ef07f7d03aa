//! Map a track id and requested file name to an object-store read.

use std::sync::Arc;

use tf_core::{media, ByteRange, Error, Result, TrackId};
use tf_db::TrackRepository;
use tf_storage::{ObjectStore, StoredObject};

/// A resolved stream plus the headers the boundary should emit.
#[derive(Debug)]
pub struct ResolvedStream {
    /// Body, size and served range from the store.
    pub object: StoredObject,
    /// Derived from the requested file name, not from the store.
    pub content_type: &'static str,
    /// Playlists may be regenerated and must not be cached.
    pub no_store: bool,
}

/// Reject anything that is not a bare file name.
pub fn validate_file_name(file: &str) -> Result<()> {
    if file.is_empty() || file == "." || file.contains("..") || file.contains(['/', '\\']) {
        return Err(Error::InvalidFileName(file.to_string()));
    }
    Ok(())
}

/// Resolves playback requests against the repository and object store.
#[derive(Clone)]
pub struct StreamResolver {
    tracks: Arc<dyn TrackRepository>,
    store: Arc<dyn ObjectStore>,
}

impl StreamResolver {
    pub fn new(tracks: Arc<dyn TrackRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { tracks, store }
    }

    /// Open `file` from the segment set of track `id`.
    ///
    /// The file name is checked before any lookup. The returned stream is
    /// pull-based, so dropping it abandons the underlying read.
    pub async fn resolve(
        &self,
        id: TrackId,
        file: &str,
        range: Option<ByteRange>,
    ) -> Result<ResolvedStream> {
        self.resolve_inner(id, file, range).await.inspect_err(|err| {
            if err.is_server_error() {
                tracing::error!(op = "stream.resolve", track_id = %id, file, code = err.code(), error = %err, "resolve failed");
            } else {
                tracing::debug!(op = "stream.resolve", track_id = %id, file, code = err.code(), "resolve rejected");
            }
        })
    }

    async fn resolve_inner(
        &self,
        id: TrackId,
        file: &str,
        range: Option<ByteRange>,
    ) -> Result<ResolvedStream> {
        validate_file_name(file)?;

        let track = self.tracks.get(id).await?;
        let hls = track.hls.ok_or(Error::TrackNotReady(id))?;

        let key = hls.key_for(file);
        let object = self.store.get(&hls.bucket, &key, range).await?;

        tracing::debug!(
            op = "stream.resolve",
            track_id = %id,
            key = %key,
            size = object.size,
            ranged = object.range.is_some(),
            "resolved stream"
        );

        Ok(ResolvedStream {
            object,
            content_type: media::content_type_for(file),
            no_store: media::is_playlist(file),
        })
    }
}
