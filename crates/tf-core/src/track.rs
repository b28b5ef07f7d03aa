//! The track record and its lifecycle.
//!
//! A track is created with a title and origin bucket, gains an origin key
//! once the upload location is decided, and becomes streamable when its HLS
//! location is recorded. The HLS bucket and prefix only ever travel together
//! as an [`HlsLocation`], so a half-recorded segment set cannot be expressed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::TrackId;
use crate::media::PLAYLIST_FILE;

/// Where a track's transcoded segment set lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlsLocation {
    pub bucket: String,
    /// Key prefix ending in `/`; playlist and segments sit directly under it.
    pub prefix: String,
}

impl HlsLocation {
    /// Object key for a file inside this segment set.
    pub fn key_for(&self, file_name: &str) -> String {
        format!("{}{}", self.prefix, file_name)
    }
}

/// Full track record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub origin_bucket: String,
    pub origin_key: Option<String>,
    pub hls: Option<HlsLocation>,
}

impl Track {
    /// The origin key has been recorded.
    pub fn is_complete(&self) -> bool {
        self.origin_key.is_some()
    }

    /// A full segment set has been recorded.
    pub fn is_streamable(&self) -> bool {
        self.hls.is_some()
    }

    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            id: self.id,
            title: self.title.clone(),
            created_at: self.created_at,
            ready: self.is_streamable(),
        }
    }
}

/// Listing view of a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSummary {
    pub id: TrackId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub ready: bool,
}

/// Canonical playback URL path for a track.
pub fn stream_path(id: TrackId) -> String {
    format!("/stream/{id}/{PLAYLIST_FILE}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(origin_key: Option<&str>, hls: Option<HlsLocation>) -> Track {
        Track {
            id: TrackId::from_raw(3),
            title: "Demo".into(),
            created_at: Utc::now(),
            origin_bucket: "originals".into(),
            origin_key: origin_key.map(String::from),
            hls,
        }
    }

    #[test]
    fn lifecycle_flags() {
        let fresh = track(None, None);
        assert!(!fresh.is_complete());
        assert!(!fresh.is_streamable());

        let uploaded = track(Some("tracks/3/source/original.mp3"), None);
        assert!(uploaded.is_complete());
        assert!(!uploaded.summary().ready);

        let ready = track(
            Some("tracks/3/source/original.mp3"),
            Some(HlsLocation {
                bucket: "hls".into(),
                prefix: "tracks/3/hls/aac_128/".into(),
            }),
        );
        assert!(ready.is_streamable());
        assert!(ready.summary().ready);
    }

    #[test]
    fn key_for_appends_file_name() {
        let loc = HlsLocation {
            bucket: "hls".into(),
            prefix: "tracks/3/hls/aac_128/".into(),
        };
        assert_eq!(loc.key_for("index.m3u8"), "tracks/3/hls/aac_128/index.m3u8");
    }

    #[test]
    fn stream_path_format() {
        assert_eq!(stream_path(TrackId::from_raw(12)), "/stream/12/index.m3u8");
    }
}
