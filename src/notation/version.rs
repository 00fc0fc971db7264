//! Schema version per RFC 7047 §3.1
//!
//! `major.minor.patch`, compared left to right, each segment numerically.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::errors::FormatError;

/// A three-part schema version.
///
/// Field order makes the derived ordering lexicographic on
/// (major, minor, patch).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
}

impl Version {
    /// Unversioned: always valid.
    pub const NULL: Version = Version::new(0, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Parses `<digits>.<digits>.<digits>`.
    ///
    /// Major and minor must be digits only. The patch segment is scanned up
    /// to its first non-digit, so `1.2.3-rc1` reads as 1.2.3.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let (major, rest) = text
            .split_once('.')
            .ok_or_else(|| FormatError::MissingSeparator(text.to_string()))?;
        let (minor, patch) = rest
            .split_once('.')
            .ok_or_else(|| FormatError::MissingSeparator(text.to_string()))?;

        let major = strict_segment(text, major, "major")?;
        let minor = strict_segment(text, minor, "minor")?;

        let digits_end = patch
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(patch.len());
        let patch = number(text, &patch[..digits_end], "patch")?;

        Ok(Self::new(major, minor, patch))
    }

    /// True iff `schema` is at or past `from` and, when `deprecated` is set,
    /// strictly before it.
    pub fn is_compatible(from: Version, deprecated: Option<Version>, schema: Version) -> bool {
        schema >= from && deprecated.map_or(true, |until| schema < until)
    }
}

fn strict_segment(text: &str, segment: &str, name: &'static str) -> Result<u32, FormatError> {
    if let Some(character) = segment.chars().find(|c| !c.is_ascii_digit()) {
        return Err(FormatError::NotADigit {
            text: text.to_string(),
            character,
        });
    }
    number(text, segment, name)
}

fn number(text: &str, digits: &str, name: &'static str) -> Result<u32, FormatError> {
    if digits.is_empty() {
        return Err(FormatError::EmptySegment {
            text: text.to_string(),
            segment: name,
        });
    }
    digits.parse::<u32>().map_err(|_| FormatError::Overflow {
        text: text.to_string(),
        segment: name,
    })
}

impl Default for Version {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Version::parse(&text).map_err(de::Error::custom)
    }
}
