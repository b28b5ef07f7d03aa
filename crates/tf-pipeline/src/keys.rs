//! Deterministic object keys derived from a track id.

use tf_core::TrackId;

/// Rendition tag of the single AAC HLS output.
pub const DEFAULT_RENDITION: &str = "aac_128";

/// Key of the unmodified upload, e.g. `tracks/7/source/original.flac`.
///
/// `extension` includes its leading dot.
pub fn origin_key(id: TrackId, extension: &str) -> String {
    format!("tracks/{id}/source/original{extension}")
}

/// Prefix under which one rendition's playlist and segments live, e.g.
/// `tracks/7/hls/aac_128/`. Always ends in `/`.
pub fn hls_prefix(id: TrackId, rendition: &str) -> String {
    format!("tracks/{id}/hls/{rendition}/")
}
