//! tf-storage: object storage for originals and transcoded segment sets.
//!
//! [`ObjectStore`] is the bucket/key capability the rest of the workspace is
//! written against. [`FsObjectStore`] keeps objects on local disk and
//! [`MemoryObjectStore`] keeps them in memory for tests and ephemeral runs.

pub mod fs;
pub mod memory;
pub mod store;

pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
pub use store::{file_stream, validate_location, ByteStream, ObjectStore, StoredObject};
