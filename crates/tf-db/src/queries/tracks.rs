//! Track CRUD operations.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tf_core::{Error, Result, TrackId};

use crate::models::{TrackRow, TRACK_COLUMNS};

/// Insert a new track with only title and origin bucket set.
pub fn create_track(conn: &Connection, title: &str, origin_bucket: &str) -> Result<TrackId> {
    let created_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO tracks (title, created_at, origin_bucket) VALUES (?1, ?2, ?3)",
        rusqlite::params![title, created_at, origin_bucket],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(TrackId::from_raw(conn.last_insert_rowid()))
}

/// Get a track by ID.
pub fn get_track(conn: &Connection, id: TrackId) -> Result<Option<TrackRow>> {
    let result = conn.query_row(
        &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1"),
        [id.get()],
        TrackRow::from_row,
    );
    match result {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Record the origin key. The key is write-once.
///
/// Returns [`Error::NotFound`] for an unknown id and [`Error::Conflict`] when
/// a different key is already recorded. Re-recording the same key is a no-op.
pub fn set_origin_key(conn: &Connection, id: TrackId, key: &str) -> Result<()> {
    let n = conn
        .execute(
            "UPDATE tracks SET origin_key = ?1 WHERE id = ?2 AND origin_key IS NULL",
            rusqlite::params![key, id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if n > 0 {
        return Ok(());
    }

    let existing: Option<Option<String>> = conn
        .query_row("SELECT origin_key FROM tracks WHERE id = ?1", [id.get()], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    match existing {
        None => Err(Error::not_found("track", id)),
        Some(Some(current)) if current == key => Ok(()),
        Some(_) => Err(Error::Conflict(format!(
            "track {id} already has an origin key"
        ))),
    }
}

/// Record the HLS bucket and prefix in a single statement.
pub fn set_hls(conn: &Connection, id: TrackId, bucket: &str, prefix: &str) -> Result<()> {
    let n = conn
        .execute(
            "UPDATE tracks SET hls_bucket = ?1, hls_prefix = ?2 WHERE id = ?3",
            rusqlite::params![bucket, prefix, id.get()],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    if n == 0 {
        return Err(Error::not_found("track", id));
    }
    Ok(())
}

/// List tracks with a recorded origin key, newest first.
pub fn list_tracks(conn: &Connection, limit: u32, offset: u64) -> Result<Vec<TrackRow>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks
             WHERE origin_key IS NOT NULL
             ORDER BY id DESC
             LIMIT ?1 OFFSET ?2"
        ))
        .map_err(|e| Error::database(e.to_string()))?;
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map(rusqlite::params![limit, offset], TrackRow::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}
