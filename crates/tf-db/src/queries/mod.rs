//! Database query modules.

pub mod tracks;
