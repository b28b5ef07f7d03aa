//! tf-core: shared types, IDs, errors, configuration, and HTTP range helpers.
//!
//! This crate is the foundational dependency for all other tf-* crates,
//! providing the track model, a unified error type, the byte-range type used
//! by the object store and stream resolver, content-type mapping, and
//! application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;
pub mod range;
pub mod track;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::TrackId;
pub use range::{ByteRange, ResolvedRange};
pub use track::{HlsLocation, Track, TrackSummary};
