//! Per-ingest scratch space.
//!
//! A [`Workspace`] owns a private temporary directory holding the staged
//! original and the transcoder's output directory. Everything is removed when
//! the workspace is dropped, whether ingestion succeeded, failed, or its
//! future was cancelled.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tf_core::Result;

/// Name of the output directory inside a workspace.
const OUTPUT_DIR: &str = "hls";

/// Stem of the staged original inside a workspace.
const INPUT_STEM: &str = "original";

pub struct Workspace {
    temp_dir: TempDir,
    input_path: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    /// Create a workspace under `parent` (the system temp dir if `None`).
    ///
    /// `extension` includes the leading dot and names the staged input file,
    /// e.g. `.flac` gives `original.flac`.
    pub fn new(parent: Option<&Path>, extension: &str) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("track-");
        let temp_dir = match parent {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };

        let input_path = temp_dir.path().join(format!("{INPUT_STEM}{extension}"));
        let output_dir = temp_dir.path().join(OUTPUT_DIR);
        std::fs::create_dir(&output_dir)?;

        Ok(Self {
            temp_dir,
            input_path,
            output_dir,
        })
    }

    /// Where the original upload is staged.
    pub fn input(&self) -> &Path {
        &self.input_path
    }

    /// Empty directory the transcoder writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path to the temporary directory.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}
