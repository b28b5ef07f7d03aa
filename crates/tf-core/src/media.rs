//! File naming and content-type conventions for originals and HLS output.

use std::path::Path;

/// Name of the playlist the transcoder writes into every segment set.
pub const PLAYLIST_FILE: &str = "index.m3u8";

/// Content type of HLS playlists.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Content type of the AAC audio segments.
pub const SEGMENT_CONTENT_TYPE: &str = "audio/aac";

/// Content type for anything we do not recognise.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension used for uploads whose file name has none.
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Longest extension kept from a client file name, excluding the dot.
pub const MAX_EXTENSION_LEN: usize = 10;

/// Lowercase extension of `file_name` including the leading dot, or
/// [`FALLBACK_EXTENSION`] when there is none.
///
/// Only ASCII alphanumeric extensions of at most [`MAX_EXTENSION_LEN`]
/// characters are kept; anything else also maps to the fallback so the
/// result is always safe inside an object key.
pub fn normalized_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.bytes().all(|b| b.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Guess the MIME type from a file name's extension.
///
/// Matching is case-insensitive. Unknown or missing extensions map to
/// [`FALLBACK_CONTENT_TYPE`].
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "m3u8" => PLAYLIST_CONTENT_TYPE,
        "aac" => SEGMENT_CONTENT_TYPE,
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        "ts" => "video/mp2t",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

/// Whether `file_name` is an HLS playlist (and so must not be cached).
pub fn is_playlist(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("m3u8"))
}
