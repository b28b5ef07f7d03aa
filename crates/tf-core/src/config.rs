//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries all
//! sub-configs for the server, object storage, tools, transcoding, and
//! listing. Every section defaults sensibly so a completely empty `{}` file
//! is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Default upload cap: 512 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 512 << 20;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub tools: ToolsConfig,
    pub transcode: TranscodeConfig,
    pub listing: ListingConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.max_upload_bytes == 0 {
            warnings.push("server.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if self.storage.origin_bucket.trim().is_empty() {
            warnings.push("storage.origin_bucket is empty".into());
        }
        if self.storage.hls_bucket.trim().is_empty() {
            warnings.push("storage.hls_bucket is empty".into());
        }

        if self.transcode.segment_seconds == 0 {
            warnings.push("transcode.segment_seconds is 0; ffmpeg will pick its own".into());
        }
        if !(1..=2).contains(&self.transcode.channels) {
            warnings.push(format!(
                "transcode.channels is {}; only mono and stereo are expected",
                self.transcode.channels
            ));
        }

        if self.listing.default_page > self.listing.max_page {
            warnings.push(format!(
                "listing.default_page ({}) exceeds listing.max_page ({})",
                self.listing.default_page, self.listing.max_page
            ));
        }

        if let Some(ref ffmpeg) = self.tools.ffmpeg_path {
            if !ffmpeg.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; PATH will be searched",
                    ffmpeg.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: u64,
    /// Serve the embedded HTML player at `/player`.
    pub player: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("./data/trackforged.db"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            player: true,
        }
    }
}

/// Object storage layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory of the filesystem object store.
    pub root: PathBuf,
    /// Bucket receiving unmodified uploads.
    pub origin_bucket: String,
    /// Bucket receiving transcoded playlists and segments.
    pub hls_bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data/objects"),
            origin_bucket: "originals".into(),
            hls_bucket: "hls".into(),
        }
    }
}

/// Paths to external CLI tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
}

/// Audio HLS transcode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Target segment duration in seconds.
    pub segment_seconds: u32,
    pub audio_bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u32,
    /// Kill the encoder after this many seconds.
    pub timeout_secs: u64,
    /// Parent directory for per-upload staging dirs (system temp if unset).
    pub staging_dir: Option<PathBuf>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            segment_seconds: 4,
            audio_bitrate_kbps: 128,
            sample_rate: 44_100,
            channels: 2,
            timeout_secs: 1800,
            staging_dir: None,
        }
    }
}

/// Track listing page sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub default_page: u32,
    pub max_page: u32,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_page: 20,
            max_page: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.max_upload_bytes, 512 * 1024 * 1024);
        assert_eq!(cfg.storage.origin_bucket, "originals");
        assert_eq!(cfg.storage.hls_bucket, "hls");
        assert_eq!(cfg.transcode.segment_seconds, 4);
        assert_eq!(cfg.listing.default_page, 20);
        assert_eq!(cfg.listing.max_page, 200);
    }

    #[test]
    fn default_config_no_warnings() {
        let cfg = Config::default();
        let warnings = cfg.validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn empty_bucket_warns() {
        let mut cfg = Config::default();
        cfg.storage.hls_bucket = " ".into();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("hls_bucket")));
    }

    #[test]
    fn missing_ffmpeg_override_warns() {
        let mut cfg = Config::default();
        cfg.tools.ffmpeg_path = Some(PathBuf::from("/nonexistent/ffmpeg"));
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("ffmpeg_path")));
    }

    #[test]
    fn inverted_page_sizes_warn() {
        let mut cfg = Config::default();
        cfg.listing.default_page = 500;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("default_page")));
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"server": {"port": 9090}, "transcode": {"segment_seconds": 6}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.transcode.segment_seconds, 6);
        assert_eq!(cfg.transcode.audio_bitrate_kbps, 128);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn parse_invalid_json_is_validation_error() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn load_or_default_with_none() {
        let cfg = Config::load_or_default(None);
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/config.json")));
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage": {"hls_bucket": "streams"}}"#).unwrap();
        let cfg = Config::load_or_default(Some(&path));
        assert_eq!(cfg.storage.hls_bucket, "streams");
        assert_eq!(cfg.storage.origin_bucket, "originals");
    }
}
