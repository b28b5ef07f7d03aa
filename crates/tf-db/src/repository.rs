//! The track repository capability and its SQLite implementation.

use async_trait::async_trait;
use tf_core::{Error, Result, Track, TrackId, TrackSummary};

use crate::pool::{get_conn, DbPool};
use crate::queries::tracks;

/// Durable record of track metadata and lifecycle fields.
///
/// Each track row is only mutated by the ingestion flow that created it, so
/// implementations need no cross-call locking.
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Create a track with only a title and origin bucket; returns its new id.
    async fn create(&self, title: &str, origin_bucket: &str) -> Result<TrackId>;

    /// Record where the original upload lives. Write-once.
    async fn set_origin_key(&self, id: TrackId, key: &str) -> Result<()>;

    /// Record the transcoded segment set. Both fields land in one write.
    async fn set_hls(&self, id: TrackId, bucket: &str, prefix: &str) -> Result<()>;

    /// Fetch a track, failing with [`Error::NotFound`] if it does not exist.
    async fn get(&self, id: TrackId) -> Result<Track>;

    /// Tracks with a recorded origin key, newest first.
    async fn list(&self, count: u32, offset: u64) -> Result<Vec<TrackSummary>>;
}

/// [`TrackRepository`] backed by the r2d2 SQLite pool.
///
/// Queries are synchronous and run on the blocking thread pool.
#[derive(Clone)]
pub struct SqliteTrackRepository {
    pool: DbPool,
}

impl SqliteTrackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&conn)
        })
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))?
    }
}

#[async_trait]
impl TrackRepository for SqliteTrackRepository {
    async fn create(&self, title: &str, origin_bucket: &str) -> Result<TrackId> {
        let title = title.to_string();
        let origin_bucket = origin_bucket.to_string();
        self.with_conn(move |conn| tracks::create_track(conn, &title, &origin_bucket))
            .await
    }

    async fn set_origin_key(&self, id: TrackId, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn| tracks::set_origin_key(conn, id, &key))
            .await
    }

    async fn set_hls(&self, id: TrackId, bucket: &str, prefix: &str) -> Result<()> {
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        self.with_conn(move |conn| tracks::set_hls(conn, id, &bucket, &prefix))
            .await
    }

    async fn get(&self, id: TrackId) -> Result<Track> {
        self.with_conn(move |conn| tracks::get_track(conn, id))
            .await?
            .map(|row| row.into_track())
            .ok_or_else(|| Error::not_found("track", id))
    }

    async fn list(&self, count: u32, offset: u64) -> Result<Vec<TrackSummary>> {
        let rows = self
            .with_conn(move |conn| tracks::list_tracks(conn, count, offset))
            .await?;
        Ok(rows.into_iter().map(|r| r.into_track().summary()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn repo() -> SqliteTrackRepository {
        SqliteTrackRepository::new(init_memory_pool().unwrap())
    }

    #[tokio::test]
    async fn lifecycle_through_trait() {
        let repo = repo();
        let id = repo.create("Demo", "originals").await.unwrap();

        let fresh = repo.get(id).await.unwrap();
        assert_eq!(fresh.title, "Demo");
        assert!(!fresh.is_complete());
        assert!(!fresh.is_streamable());

        repo.set_origin_key(id, "tracks/1/source/original.flac")
            .await
            .unwrap();
        repo.set_hls(id, "hls", "tracks/1/hls/aac_128/").await.unwrap();

        let done = repo.get(id).await.unwrap();
        assert_eq!(done.origin_key.as_deref(), Some("tracks/1/source/original.flac"));
        let hls = done.hls.unwrap();
        assert_eq!(hls.bucket, "hls");
        assert_eq!(hls.prefix, "tracks/1/hls/aac_128/");
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let err = repo().get(TrackId::from_raw(12)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn list_reports_readiness() {
        let repo = repo();
        let a = repo.create("A", "originals").await.unwrap();
        let b = repo.create("B", "originals").await.unwrap();
        repo.set_origin_key(a, "ka").await.unwrap();
        repo.set_origin_key(b, "kb").await.unwrap();
        repo.set_hls(b, "hls", "pb/").await.unwrap();

        let list = repo.list(20, 0).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, b);
        assert!(list[0].ready);
        assert_eq!(list[1].id, a);
        assert!(!list[1].ready);
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.db");
        let repo = SqliteTrackRepository::new(crate::init_pool(path.to_str().unwrap()).unwrap());
        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&format!("t{i}"), "originals").await.unwrap()
            }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
    }
}
