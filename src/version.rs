//! Game version values with stop-short comparison
//!
//! A version bound written in an annotation may omit its minor and revision
//! components (`1`, `1.8`, `1.8.1`). An omitted component is a wildcard: once
//! either side runs out of components, comparison stops and the two versions
//! are considered equal at that level.

use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors when reading the running game version
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid game version '{value}': {message}")]
    Invalid { value: String, message: String },
}

/// A game version, possibly partial when used as a bound.
///
/// `revision` is only ever present together with `minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameVersion {
    major: u32,
    minor: Option<u32>,
    revision: Option<u32>,
}

impl GameVersion {
    /// A fully specified version, as reported by the running game.
    pub const fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
            revision: Some(revision),
        }
    }

    pub const fn major_only(major: u32) -> Self {
        Self {
            major,
            minor: None,
            revision: None,
        }
    }

    pub const fn major_minor(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
            revision: None,
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> Option<u32> {
        self.minor
    }

    pub fn revision(&self) -> Option<u32> {
        self.revision
    }

    pub fn is_complete(&self) -> bool {
        self.revision.is_some()
    }

    /// Stop-short comparison.
    ///
    /// Major always decides when it differs. Minor is only compared when both
    /// sides carry one, and likewise revision.
    ///
    /// ```
    /// use ksp_version_gate::GameVersion;
    /// use std::cmp::Ordering;
    ///
    /// let running = GameVersion::new(1, 8, 1);
    /// assert_eq!(running.compare(&GameVersion::major_minor(1, 8)), Ordering::Equal);
    /// assert_eq!(running.compare(&GameVersion::major_minor(1, 7)), Ordering::Greater);
    /// assert_eq!(running.compare(&GameVersion::major_only(2)), Ordering::Less);
    /// ```
    pub fn compare(&self, other: &GameVersion) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            unequal => return unequal,
        }

        let (Some(minor), Some(other_minor)) = (self.minor, other.minor) else {
            return Ordering::Equal;
        };
        match minor.cmp(&other_minor) {
            Ordering::Equal => {}
            unequal => return unequal,
        }

        match (self.revision, other.revision) {
            (Some(revision), Some(other_revision)) => revision.cmp(&other_revision),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.major)?;
        if let Some(minor) = self.minor {
            write!(f, ".{}", minor)?;
            if let Some(revision) = self.revision {
                write!(f, ".{}", revision)?;
            }
        }
        Ok(())
    }
}

/// Parses the running game version, which must carry all three components.
impl FromStr for GameVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| VersionError::Invalid {
            value: s.to_string(),
            message: message.to_string(),
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(invalid("expected major.minor.revision"));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("components must be non-negative integers"));
            }
            *slot = part
                .parse()
                .map_err(|_| invalid("component out of range"))?;
        }

        Ok(GameVersion::new(numbers[0], numbers[1], numbers[2]))
    }
}

/// Deserializes from a `major.minor.revision` string, surfacing the parse
/// error as the deserializer's message.
impl<'de> Deserialize<'de> for GameVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<GameVersion>().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_compare_full_versions() {
        let running = GameVersion::new(1, 8, 1);
        assert_eq!(running.compare(&GameVersion::new(1, 8, 1)), Ordering::Equal);
        assert_eq!(running.compare(&GameVersion::new(1, 8, 0)), Ordering::Greater);
        assert_eq!(running.compare(&GameVersion::new(1, 9, 0)), Ordering::Less);
        assert_eq!(running.compare(&GameVersion::new(0, 90, 0)), Ordering::Greater);
    }

    #[test]
    fn test_missing_components_are_wildcards() {
        let running = GameVersion::new(1, 2, 3);
        assert_eq!(running.compare(&GameVersion::major_minor(1, 2)), Ordering::Equal);
        assert_eq!(running.compare(&GameVersion::major_only(1)), Ordering::Equal);
        assert_eq!(running.compare(&GameVersion::major_minor(1, 3)), Ordering::Less);
        assert_eq!(
            GameVersion::major_minor(1, 2).compare(&running),
            Ordering::Equal
        );
    }

    #[test]
    fn test_parse_running_version() {
        let version: GameVersion = "1.8.1".parse().unwrap();
        assert_eq!(version, GameVersion::new(1, 8, 1));
        assert!(version.is_complete());
        assert_eq!(version.to_string(), "1.8.1");
    }

    #[test]
    fn test_parse_rejects_partial_or_garbage() {
        for input in ["1.8", "1", "", "1.8.x", "1..1", "-1.0.0", "1.8.1.0", "+1.8.1"] {
            let result = input.parse::<GameVersion>();
            assert!(
                matches!(result, Err(VersionError::Invalid { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_deserialize_from_string() {
        let version: GameVersion = serde_json::from_str("\"1.12.5\"").unwrap();
        assert_eq!(version, GameVersion::new(1, 12, 5));

        let err = serde_json::from_str::<GameVersion>("\"1.12\"").unwrap_err();
        assert!(err.to_string().contains("expected major.minor.revision"));
    }

    #[test]
    fn test_display_partial() {
        assert_eq!(GameVersion::major_only(2).to_string(), "2");
        assert_eq!(GameVersion::major_minor(1, 12).to_string(), "1.12");
    }

    proptest! {
        #[test]
        fn prop_full_versions_compare_like_tuples(
            a in (0u32..20, 0u32..20, 0u32..20),
            b in (0u32..20, 0u32..20, 0u32..20),
        ) {
            let left = GameVersion::new(a.0, a.1, a.2);
            let right = GameVersion::new(b.0, b.1, b.2);
            prop_assert_eq!(left.compare(&right), a.cmp(&b));
        }

        #[test]
        fn prop_major_minor_bound_ignores_revision(
            major in 0u32..20,
            minor in 0u32..20,
            revision in 0u32..1000,
        ) {
            let running = GameVersion::new(major, minor, revision);
            prop_assert_eq!(
                running.compare(&GameVersion::major_minor(major, minor)),
                Ordering::Equal
            );
        }
    }
}
