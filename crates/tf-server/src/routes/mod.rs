//! Route handlers for the HTTP API.

pub mod health;
pub mod player;
pub mod stream;
pub mod tracks;
pub mod upload;

use tf_core::{Error, TrackId};

/// Parse a `{id}` path segment into a [`TrackId`].
pub(crate) fn parse_track_id(raw: &str) -> Result<TrackId, Error> {
    raw.parse()
        .map_err(|e: tf_core::ids::ParseTrackIdError| Error::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_track_id_maps_to_validation() {
        assert_eq!(parse_track_id("5").unwrap().get(), 5);
        assert!(matches!(parse_track_id("abc"), Err(Error::Validation(_))));
        assert!(matches!(parse_track_id("0"), Err(Error::Validation(_))));
    }
}
