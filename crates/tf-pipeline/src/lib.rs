//! tf-pipeline: track ingestion and stream resolution.
//!
//! [`IngestService`] turns one upload into a stored original plus a
//! streamable HLS segment set, recording progress on the track as it goes.
//! [`StreamResolver`] maps a track id and file name to an object-store read.
//! [`TrackCatalog`] serves listings and lookups.
//!
//! All three are written against the [`TrackRepository`], [`ObjectStore`] and
//! [`Transcoder`] capabilities, so any backend combination can be wired in.
//!
//! [`TrackRepository`]: tf_db::TrackRepository
//! [`ObjectStore`]: tf_storage::ObjectStore
//! [`Transcoder`]: tf_av::Transcoder

pub mod catalog;
pub mod ingest;
pub mod keys;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{ListingSettings, TrackCatalog};
pub use ingest::{IngestService, IngestSettings, IngestedTrack};
pub use resolver::{validate_file_name, ResolvedStream, StreamResolver};
