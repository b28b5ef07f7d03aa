//! # tf-av
//!
//! External encoder management and audio transcoding for trackforged.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to
//!   ffmpeg, honouring a configured override.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support; the child is killed if the future is dropped.
//! - **Workspace management** ([`Workspace`]) -- per-ingest temporary
//!   directory holding the staged original and the transcode output.
//! - **Transcoding** ([`Transcoder`], [`FfmpegTranscoder`]) -- turn one input
//!   file into an AAC HLS playlist plus ordered segments.

pub mod command;
pub mod tools;
pub mod transcoder;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcoder::{FfmpegTranscoder, SegmentSet, TranscodeSettings, Transcoder};
pub use workspace::Workspace;
