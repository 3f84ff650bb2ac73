//! Version parsing and minimum-version gates
//!
//! CLI versions look like `0.30.23`, sometimes followed by prerelease or
//! build metadata (`0.31.0-dev`, `0.30.3+a1b2c3`) that plays no part in
//! ordering. Missing trailing components count as zero.

use crate::error::{BridgeError, Result};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` version, ordered component by component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version number
    pub major: u64,
    /// Minor version number
    pub minor: u64,
    /// Patch version number
    pub patch: u64,
}

impl Version {
    /// Create a version from its components
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = |reason: &str| BridgeError::MalformedVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let core = input.trim();
        let core = core.split(['-', '+']).next().unwrap_or(core);
        if core.is_empty() {
            return Err(malformed("empty version"));
        }

        let mut parts = [0u64; 3];
        for (index, part) in core.split('.').enumerate() {
            if index >= parts.len() {
                return Err(malformed("more than three components"));
            }
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed("components must be decimal numbers"));
            }
            parts[index] = part
                .parse()
                .map_err(|_| malformed("component out of range"))?;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl FromStr for Version {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Result of checking a version against a minimum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// Whether the actual version is at least the minimum
    pub satisfied: bool,
    /// The minimum, exactly as it was given
    pub minimum: String,
}

/// Minimum-version checks
pub struct VersionGate;

impl VersionGate {
    /// Compare `actual` against `minimum`
    ///
    /// Fails only when either string is malformed.
    pub fn compare(actual: &str, minimum: &str) -> Result<GateOutcome> {
        let satisfied = Version::parse(actual)? >= Version::parse(minimum)?;
        Ok(GateOutcome {
            satisfied,
            minimum: minimum.to_string(),
        })
    }

    /// Like [`compare`](Self::compare), but an unmet minimum is an
    /// [`BridgeError::UnsupportedVersion`] error
    pub fn require(actual: &str, minimum: &str) -> Result<()> {
        let outcome = Self::compare(actual, minimum)?;
        if outcome.satisfied {
            Ok(())
        } else {
            Err(BridgeError::UnsupportedVersion {
                actual: actual.to_string(),
                minimum: outcome.minimum,
            })
        }
    }
}
