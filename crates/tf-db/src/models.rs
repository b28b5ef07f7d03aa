//! Rust structs mapping to database tables.

use chrono::{DateTime, Utc};
use tf_core::{HlsLocation, Track, TrackId};

/// Column list matching [`TrackRow::from_row`].
pub const TRACK_COLUMNS: &str =
    "id, title, created_at, origin_bucket, origin_key, hls_bucket, hls_prefix";

/// A row of the `tracks` table.
#[derive(Debug, Clone)]
pub struct TrackRow {
    pub id: i64,
    pub title: String,
    pub created_at: String,
    pub origin_bucket: String,
    pub origin_key: Option<String>,
    pub hls_bucket: Option<String>,
    pub hls_prefix: Option<String>,
}

impl TrackRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            created_at: row.get(2)?,
            origin_bucket: row.get(3)?,
            origin_key: row.get(4)?,
            hls_bucket: row.get(5)?,
            hls_prefix: row.get(6)?,
        })
    }

    /// Convert into the domain record.
    ///
    /// An unparseable timestamp falls back to the Unix epoch rather than
    /// failing the whole read.
    pub fn into_track(self) -> Track {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();
        let hls = match (self.hls_bucket, self.hls_prefix) {
            (Some(bucket), Some(prefix)) => Some(HlsLocation { bucket, prefix }),
            _ => None,
        };
        Track {
            id: TrackId::from_raw(self.id),
            title: self.title,
            created_at,
            origin_bucket: self.origin_bucket,
            origin_key: self.origin_key,
            hls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hls_bucket: Option<&str>, hls_prefix: Option<&str>) -> TrackRow {
        TrackRow {
            id: 5,
            title: "Song".into(),
            created_at: "2024-03-01T12:00:00+00:00".into(),
            origin_bucket: "originals".into(),
            origin_key: Some("tracks/5/source/original.mp3".into()),
            hls_bucket: hls_bucket.map(String::from),
            hls_prefix: hls_prefix.map(String::from),
        }
    }

    #[test]
    fn into_track_with_hls() {
        let track = row(Some("hls"), Some("tracks/5/hls/aac_128/")).into_track();
        assert_eq!(track.id.get(), 5);
        assert_eq!(track.hls.unwrap().prefix, "tracks/5/hls/aac_128/");
        assert_eq!(track.created_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn into_track_without_hls() {
        let track = row(None, None).into_track();
        assert!(track.hls.is_none());
        assert!(track.is_complete());
    }

    #[test]
    fn bad_timestamp_falls_back_to_epoch() {
        let mut r = row(None, None);
        r.created_at = "yesterday".into();
        assert_eq!(r.into_track().created_at.timestamp(), 0);
    }
}
