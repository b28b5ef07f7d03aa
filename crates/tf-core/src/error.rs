//! Unified error type for the trackforged application.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`]
//! and a caller-safe message via [`Error::public_message`].

use std::fmt;

use crate::ids::TrackId;

/// Unified error type covering all failure modes in trackforged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "track").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The upload exceeded the configured size cap.
    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge {
        /// Maximum accepted size in bytes.
        limit: u64,
    },

    /// A stream file name was not a bare file name.
    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    /// The track exists but has no transcoded segment set recorded yet.
    #[error("Track {0} is not ready for streaming")]
    TrackNotReady(TrackId),

    /// The object store has no object under the composed key.
    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound {
        /// Bucket that was read.
        bucket: String,
        /// Key that was read.
        key: String,
    },

    /// The requested byte range starts beyond the end of the object.
    #[error("Range not satisfiable for object of {size} bytes")]
    RangeNotSatisfiable {
        /// Total object size in bytes.
        size: u64,
    },

    /// A write conflicted with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The external encoder could not be located or started.
    #[error("Encoder unavailable [{tool}]: {message}")]
    EncoderUnavailable {
        /// Name of the encoder binary.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// The external encoder ran but did not succeed.
    #[error("Encoding failed [{tool}]: {diagnostics}")]
    EncodingFailed {
        /// Name of the encoder binary.
        tool: String,
        /// Exit status and captured diagnostic output.
        diagnostics: String,
    },

    /// Creating or updating the track record failed during ingestion.
    #[error("Metadata write failed [{step}]: {source}")]
    MetadataWriteFailed {
        /// The repository call that failed.
        step: String,
        /// The underlying failure.
        source: Box<Error>,
    },

    /// Staging or storing the original upload failed.
    #[error("Origin upload failed: {source}")]
    OriginUploadFailed {
        /// The underlying failure.
        source: Box<Error>,
    },

    /// The transcoder did not produce a segment set.
    #[error("Transcode failed: {source}")]
    TranscodeFailed {
        /// The underlying transcoder failure.
        source: Box<Error>,
    },

    /// Storing one of the transcoded files failed.
    #[error("Segment upload failed [{key}]: {source}")]
    SegmentUploadFailed {
        /// Object key that could not be written.
        key: String,
        /// The underlying failure.
        source: Box<Error>,
    },

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An object store backend operation failed.
    #[error("Storage error: {source}")]
    Storage {
        /// The underlying storage error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::PayloadTooLarge { .. } => 413,
            Error::InvalidFileName(_) => 400,
            Error::TrackNotReady(_) => 404,
            Error::ObjectNotFound { .. } => 404,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::Conflict(_) => 409,
            Error::EncoderUnavailable { .. } => 503,
            Error::EncodingFailed { .. } => 502,
            Error::MetadataWriteFailed { .. } => 500,
            Error::OriginUploadFailed { .. } => 500,
            Error::TranscodeFailed { source } => match source.http_status() {
                status if status >= 500 => status,
                _ => 500,
            },
            Error::SegmentUploadFailed { .. } => 500,
            Error::Database { .. } => 500,
            Error::Storage { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::PayloadTooLarge { .. } => "payload_too_large",
            Error::InvalidFileName(_) => "invalid_file_name",
            Error::TrackNotReady(_) => "track_not_ready",
            Error::ObjectNotFound { .. } => "object_not_found",
            Error::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Error::Conflict(_) => "conflict",
            Error::EncoderUnavailable { .. } => "encoder_unavailable",
            Error::EncodingFailed { .. } => "encoding_failed",
            Error::MetadataWriteFailed { .. } => "metadata_write_failed",
            Error::OriginUploadFailed { .. } => "origin_upload_failed",
            Error::TranscodeFailed { .. } => "transcode_failed",
            Error::SegmentUploadFailed { .. } => "segment_upload_failed",
            Error::Database { .. } => "database_error",
            Error::Storage { .. } => "storage_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Whether this error maps to a 5xx status.
    pub fn is_server_error(&self) -> bool {
        self.http_status() >= 500
    }

    /// Message that is safe to hand to an API caller.
    ///
    /// Client errors describe what was wrong with the request. Server errors
    /// collapse to a fixed sentence per failure class so driver output, tool
    /// diagnostics and storage layout never leave the process.
    pub fn public_message(&self) -> String {
        match self {
            Error::NotFound { .. }
            | Error::Validation(_)
            | Error::PayloadTooLarge { .. }
            | Error::InvalidFileName(_)
            | Error::RangeNotSatisfiable { .. }
            | Error::Conflict(_) => self.to_string(),
            Error::TrackNotReady(id) => {
                format!("track {id} is not ready for streaming yet; try again later")
            }
            Error::ObjectNotFound { .. } => "stream file not found".into(),
            Error::EncoderUnavailable { .. } => "transcoder is unavailable".into(),
            Error::EncodingFailed { .. } | Error::TranscodeFailed { .. } => {
                "failed to transcode track".into()
            }
            Error::MetadataWriteFailed { .. } => "failed to record track".into(),
            Error::OriginUploadFailed { .. } => "failed to store uploaded file".into(),
            Error::SegmentUploadFailed { .. } => "failed to store transcoded track".into(),
            Error::Database { .. } | Error::Storage { .. } | Error::Io { .. } | Error::Internal(_) => {
                "internal server error".into()
            }
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Storage`].
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Storage {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::ObjectNotFound`].
    pub fn object_not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Error::ObjectNotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Convenience constructor for [`Error::EncoderUnavailable`].
    pub fn encoder_unavailable(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::EncoderUnavailable {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::EncodingFailed`].
    pub fn encoding_failed(tool: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Error::EncodingFailed {
            tool: tool.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Wrap a repository failure that happened at `step` of ingestion.
    pub fn metadata_write(step: impl Into<String>, source: Error) -> Self {
        Error::MetadataWriteFailed {
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a failure while staging or storing the original upload.
    pub fn origin_upload(source: Error) -> Self {
        Error::OriginUploadFailed {
            source: Box::new(source),
        }
    }

    /// Wrap a transcoder failure.
    pub fn transcode(source: Error) -> Self {
        Error::TranscodeFailed {
            source: Box::new(source),
        }
    }

    /// Wrap a failure while storing the transcoded file under `key`.
    pub fn segment_upload(key: impl Into<String>, source: Error) -> Self {
        Error::SegmentUploadFailed {
            key: key.into(),
            source: Box::new(source),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
