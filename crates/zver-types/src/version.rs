use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// A version in the ZLS/Zig semver dialect.
///
/// Exactly two shapes parse:
///
/// - `MAJOR.MINOR.PATCH` — a **tagged** release
/// - `MAJOR.MINOR.PATCH-dev.HEIGHT+COMMITID` — a **development build**,
///   where `HEIGHT` is the commit height and `COMMITID` is 7 to 9 hex
///   characters
///
/// Ordering is lexicographic on `(major, minor, patch)`; for equal
/// triples a tagged version is greater than any development build, and
/// development builds order by commit height. The commit id participates
/// in neither ordering nor equality, so `Eq` stays consistent with `Ord`:
///
/// ```
/// use zver_types::Version;
///
/// let a: Version = "0.12.0-dev.1+aaaaaaa".parse().unwrap();
/// let b: Version = "0.12.0-dev.5+aaaaaaa".parse().unwrap();
/// let tagged: Version = "0.12.0".parse().unwrap();
/// assert!(a < b);
/// assert!(b < tagged);
/// ```
#[derive(Clone, Debug)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub dev: Option<DevSuffix>,
}

/// The `-dev.HEIGHT+COMMITID` suffix of a development build.
#[derive(Clone, Debug)]
pub struct DevSuffix {
    pub commit_height: u64,
    pub commit_id: String,
}

impl Version {
    /// A tagged version.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            dev: None,
        }
    }

    /// A development build.
    pub fn development(
        major: u64,
        minor: u64,
        patch: u64,
        commit_height: u64,
        commit_id: impl Into<String>,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            dev: Some(DevSuffix {
                commit_height,
                commit_id: commit_id.into(),
            }),
        }
    }

    /// Parse a version string. Returns `None` for any shape other than
    /// the two accepted ones, including numeric overflow.
    pub fn parse(s: &str) -> Option<Self> {
        let (triple, suffix) = match s.split_once('-') {
            Some((triple, suffix)) => (triple, Some(suffix)),
            None => (s, None),
        };

        let mut parts = triple.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }

        let dev = match suffix {
            None => None,
            Some(suffix) => {
                let rest = suffix.strip_prefix("dev.")?;
                let (height, commit_id) = rest.split_once('+')?;
                let commit_height = parse_component(height)?;
                if !(7..=9).contains(&commit_id.len())
                    || !commit_id.bytes().all(|b| b.is_ascii_hexdigit())
                {
                    return None;
                }
                Some(DevSuffix {
                    commit_height,
                    commit_id: commit_id.to_string(),
                })
            }
        };

        Some(Self {
            major,
            minor,
            patch,
            dev,
        })
    }

    /// Returns `true` if this version has no development suffix.
    pub fn is_tagged(&self) -> bool {
        self.dev.is_none()
    }
}

fn parse_component(s: &str) -> Option<u64> {
    // `u64::from_str` tolerates a leading `+`, which the dialect does not.
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| match (&self.dev, &other.dev) {
                (None, None) => Ordering::Equal,
                // A tagged version is newer than any dev build of its triple.
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.commit_height.cmp(&b.commit_height),
            })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(dev) = &self.dev {
            write!(f, "-dev.{}+{}", dev.commit_height, dev.commit_id)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| TypeError::InvalidVersion(s.to_string()))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
