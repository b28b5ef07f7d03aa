//! tf-db: track metadata persistence.
//!
//! SQLite storage with r2d2 connection pooling, embedded migrations, a typed
//! row model, synchronous query functions, and the async [`TrackRepository`]
//! seam the ingestion pipeline and stream resolver are written against.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod repository;

pub use pool::{init_memory_pool, init_pool, DbPool};
pub use repository::{SqliteTrackRepository, TrackRepository};
