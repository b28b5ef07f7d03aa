//! Track listing and lookup.

use std::sync::Arc;

use tf_core::config::ListingConfig;
use tf_core::{Result, Track, TrackId, TrackSummary};
use tf_db::TrackRepository;

/// Page size bounds for listings.
#[derive(Debug, Clone, Copy)]
pub struct ListingSettings {
    pub default_page: u32,
    pub max_page: u32,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self::from(&ListingConfig::default())
    }
}

impl From<&ListingConfig> for ListingSettings {
    fn from(cfg: &ListingConfig) -> Self {
        Self {
            default_page: cfg.default_page,
            max_page: cfg.max_page,
        }
    }
}

impl ListingSettings {
    /// Clamp caller-supplied paging: non-positive counts take the default,
    /// oversized counts are capped, negative offsets become zero.
    pub fn clamp(&self, count: Option<i64>, offset: Option<i64>) -> (u32, u64) {
        let count = match count {
            Some(c) if c > 0 => u32::try_from(c).unwrap_or(u32::MAX).min(self.max_page),
            _ => self.default_page.min(self.max_page),
        };
        let offset = offset.map_or(0, |o| o.max(0) as u64);
        (count, offset)
    }
}

/// Read-side queries over tracks.
#[derive(Clone)]
pub struct TrackCatalog {
    tracks: Arc<dyn TrackRepository>,
    settings: ListingSettings,
}

impl TrackCatalog {
    pub fn new(tracks: Arc<dyn TrackRepository>, settings: ListingSettings) -> Self {
        Self { tracks, settings }
    }

    /// Tracks with a stored original, newest first.
    pub async fn list(&self, count: Option<i64>, offset: Option<i64>) -> Result<Vec<TrackSummary>> {
        let (count, offset) = self.settings.clamp(count, offset);
        let items = self.tracks.list(count, offset).await.inspect_err(|e| {
            tracing::error!(op = "tracks.list", count, offset, error = %e, "listing failed");
        })?;
        tracing::debug!(op = "tracks.list", count, offset, returned = items.len(), "listed tracks");
        Ok(items)
    }

    /// A single track. Tracks whose original never landed are reported as
    /// missing, matching the listing.
    pub async fn get(&self, id: TrackId) -> Result<Track> {
        let track = self.tracks.get(id).await?;
        if !track.is_complete() {
            return Err(tf_core::Error::not_found("track", id));
        }
        Ok(track)
    }
}
