//! Audio transcoding into an HLS segment set.
//!
//! [`Transcoder`] is the capability the ingestion pipeline calls;
//! [`FfmpegTranscoder`] fulfils it by running ffmpeg to produce a VOD
//! playlist plus fixed-duration AAC segments.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tf_core::config::TranscodeConfig;
use tf_core::media::PLAYLIST_FILE;
use tf_core::{Error, Result};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Segment file name pattern handed to ffmpeg.
const SEGMENT_PATTERN: &str = "seg_%05d.aac";

/// Files produced by one transcode, as found in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSet {
    /// The playlist file.
    pub playlist: PathBuf,
    /// Every other file in the output directory, sorted by name.
    pub segments: Vec<PathBuf>,
}

impl SegmentSet {
    /// Collect the regular files in `output_dir`.
    ///
    /// Fails with [`Error::EncodingFailed`] when no playlist was written.
    pub fn scan(tool: &str, output_dir: &Path) -> Result<Self> {
        let mut playlist = None;
        let mut segments = Vec::new();

        for entry in std::fs::read_dir(output_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            if entry.file_name() == PLAYLIST_FILE {
                playlist = Some(path);
            } else {
                segments.push(path);
            }
        }
        segments.sort();

        let playlist = playlist.ok_or_else(|| {
            Error::encoding_failed(
                tool,
                format!("no {PLAYLIST_FILE} written to {}", output_dir.display()),
            )
        })?;

        Ok(Self { playlist, segments })
    }

    /// Segments in order, then the playlist.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.segments
            .iter()
            .map(PathBuf::as_path)
            .chain(std::iter::once(self.playlist.as_path()))
    }

    /// Total number of files including the playlist.
    pub fn len(&self) -> usize {
        self.segments.len() + 1
    }

    /// A segment set always holds at least its playlist.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Converts one input file into a playlist plus ordered segments.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write a segment set for `input` into `output_dir`.
    ///
    /// Only `output_dir` is written; `input` is left untouched. On failure the
    /// caller owns cleanup of whatever was written. The last segment may be
    /// shorter than `segment_seconds`.
    async fn to_segments(
        &self,
        input: &Path,
        output_dir: &Path,
        segment_seconds: u32,
    ) -> Result<SegmentSet>;
}

/// Encoder parameters for the single AAC rendition.
#[derive(Debug, Clone)]
pub struct TranscodeSettings {
    pub audio_bitrate_kbps: u32,
    pub sample_rate: u32,
    pub channels: u32,
    pub timeout: Duration,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self::from(&TranscodeConfig::default())
    }
}

impl From<&TranscodeConfig> for TranscodeSettings {
    fn from(cfg: &TranscodeConfig) -> Self {
        Self {
            audio_bitrate_kbps: cfg.audio_bitrate_kbps,
            sample_rate: cfg.sample_rate,
            channels: cfg.channels,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

/// [`Transcoder`] backed by the ffmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    tools: Arc<ToolRegistry>,
    settings: TranscodeSettings,
}

impl FfmpegTranscoder {
    pub fn new(tools: Arc<ToolRegistry>, settings: TranscodeSettings) -> Self {
        Self { tools, settings }
    }

    /// Build the ffmpeg invocation without running it.
    pub fn command(
        &self,
        input: &Path,
        output_dir: &Path,
        segment_seconds: u32,
    ) -> Result<ToolCommand> {
        let ffmpeg = self.tools.require("ffmpeg")?;
        let segment_seconds = segment_seconds.max(1);

        let mut cmd = ToolCommand::new(ffmpeg.path.clone());
        cmd.timeout(self.settings.timeout);
        cmd.args(["-hide_banner", "-nostdin", "-y", "-i"]);
        cmd.arg(input.to_string_lossy());
        cmd.args(["-vn", "-c:a", "aac"]);
        cmd.arg("-b:a").arg(format!("{}k", self.settings.audio_bitrate_kbps));
        cmd.arg("-ar").arg(self.settings.sample_rate.to_string());
        cmd.arg("-ac").arg(self.settings.channels.to_string());
        cmd.args(["-f", "hls"]);
        cmd.arg("-hls_time").arg(segment_seconds.to_string());
        cmd.args(["-hls_playlist_type", "vod"]);
        cmd.arg("-hls_segment_filename")
            .arg(output_dir.join(SEGMENT_PATTERN).to_string_lossy());
        cmd.arg(output_dir.join(PLAYLIST_FILE).to_string_lossy());
        Ok(cmd)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn to_segments(
        &self,
        input: &Path,
        output_dir: &Path,
        segment_seconds: u32,
    ) -> Result<SegmentSet> {
        let cmd = self.command(input, output_dir, segment_seconds)?;

        tracing::info!(
            op = "transcode.to_segments",
            input = %input.display(),
            segment_seconds,
            "starting ffmpeg"
        );
        let started = std::time::Instant::now();
        cmd.execute().await?;

        let set = SegmentSet::scan("ffmpeg", output_dir)?;
        tracing::info!(
            op = "transcode.to_segments",
            segments = set.segments.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ffmpeg finished"
        );
        Ok(set)
    }
}
