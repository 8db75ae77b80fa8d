//! Firmware version metadata.
//!
//! Every probe receives the target's [`TargetMetadata`] and gates its
//! endpoint selection on the `(major, minor)` pair. Ordering is
//! lexicographic, so `7.6 > 7.0` and `8.0 > 7.6`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A FortiOS firmware version reduced to `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub major: u32,
    pub minor: u32,
}

impl FirmwareVersion {
    /// The lowest possible version; matches every target.
    pub const ANY: FirmwareVersion = FirmwareVersion::new(0, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a FortiOS version string such as `"v7.4.3"`, `"7.4"` or `"7"`.
    ///
    /// Anything after the numeric part (`"v7.4.3,build2573"`) is ignored,
    /// as is the patch level.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::Version {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        let numeric: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let numeric = numeric.trim_end_matches('.');
        if numeric.is_empty() {
            return Err(invalid("no numeric component"));
        }

        let normalized = match numeric.split('.').count() {
            1 => format!("{numeric}.0.0"),
            2 => format!("{numeric}.0"),
            3 => numeric.to_string(),
            _ => numeric.splitn(4, '.').take(3).collect::<Vec<_>>().join("."),
        };

        let parsed = semver::Version::parse(&normalized).map_err(|e| invalid(&e.to_string()))?;
        let major = u32::try_from(parsed.major).map_err(|_| invalid("major out of range"))?;
        let minor = u32::try_from(parsed.minor).map_err(|_| invalid("minor out of range"))?;
        Ok(Self::new(major, minor))
    }

    /// Whether this version is at or above `floor`.
    pub fn at_least(self, floor: FirmwareVersion) -> bool {
        self >= floor
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Per-target metadata supplied once per scrape and shared read-only by
/// every probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMetadata {
    pub version_major: u32,
    pub version_minor: u32,
}

impl TargetMetadata {
    pub const fn new(version_major: u32, version_minor: u32) -> Self {
        Self {
            version_major,
            version_minor,
        }
    }

    pub fn version(&self) -> FirmwareVersion {
        FirmwareVersion::new(self.version_major, self.version_minor)
    }
}

impl From<FirmwareVersion> for TargetMetadata {
    fn from(v: FirmwareVersion) -> Self {
        Self::new(v.major, v.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fortios_strings() {
        assert_eq!(FirmwareVersion::parse("v7.4.3").unwrap(), FirmwareVersion::new(7, 4));
        assert_eq!(FirmwareVersion::parse("7.6").unwrap(), FirmwareVersion::new(7, 6));
        assert_eq!(FirmwareVersion::parse("6").unwrap(), FirmwareVersion::new(6, 0));
        assert_eq!(
            FirmwareVersion::parse(" v7.2.10,build1688 ").unwrap(),
            FirmwareVersion::new(7, 2)
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(FirmwareVersion::parse("").is_err());
        assert!(FirmwareVersion::parse("vX").is_err());
        assert!(FirmwareVersion::parse("build1688").is_err());
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(FirmwareVersion::new(7, 6) > FirmwareVersion::new(7, 0));
        assert!(FirmwareVersion::new(8, 0) > FirmwareVersion::new(7, 6));
        assert!(FirmwareVersion::new(8, 0).at_least(FirmwareVersion::new(7, 4)));
        assert!(!FirmwareVersion::new(7, 2).at_least(FirmwareVersion::new(7, 4)));
        assert!(FirmwareVersion::new(6, 4).at_least(FirmwareVersion::ANY));
    }

    #[test]
    fn metadata_round_trips_version() {
        let meta = TargetMetadata::from(FirmwareVersion::new(7, 4));
        assert_eq!(meta.version_major, 7);
        assert_eq!(meta.version_minor, 4);
        assert_eq!(meta.version().to_string(), "7.4");
    }
}
