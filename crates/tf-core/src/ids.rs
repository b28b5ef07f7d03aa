//! Typed track identifier.
//!
//! Track ids are assigned by the repository on creation and increase
//! monotonically. The newtype keeps them from being confused with counts,
//! offsets, or sizes that are also plain integers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a track record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(i64);

impl TrackId {
    /// Wrap a raw id as returned by the repository.
    #[must_use]
    pub const fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Return the raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a path segment is not a positive integer id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid track id: {0:?}")]
pub struct ParseTrackIdError(String);

impl FromStr for TrackId {
    type Err = ParseTrackIdError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(ParseTrackIdError(s.to_string())),
        }
    }
}

impl From<TrackId> for i64 {
    fn from(id: TrackId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_from_str() {
        let id = TrackId::from_raw(42);
        assert_eq!(id.to_string(), "42");
        let parsed: TrackId = "42".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_non_positive_and_garbage() {
        assert!("0".parse::<TrackId>().is_err());
        assert!("-3".parse::<TrackId>().is_err());
        assert!("abc".parse::<TrackId>().is_err());
        assert!("".parse::<TrackId>().is_err());
        assert!("1.5".parse::<TrackId>().is_err());
    }

    #[test]
    fn serializes_as_plain_integer() {
        let json = serde_json::to_string(&TrackId::from_raw(9)).unwrap();
        assert_eq!(json, "9");
        let back: TrackId = serde_json::from_str("9").unwrap();
        assert_eq!(back.get(), 9);
    }

    #[test]
    fn ordering_follows_assignment() {
        assert!(TrackId::from_raw(1) < TrackId::from_raw(2));
    }
}
