//! FortiOS firmware versions as reported by the device (`v7.2.4`).

use crate::error::PlugError;
use semver::Version;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FirmwareVersion(Version);

impl FirmwareVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }
}

impl FromStr for FirmwareVersion {
    type Err = PlugError;

    /// Accepts `v7.2.4`, `7.2.4` and short forms such as `6.4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(['v', 'V']);
        if trimmed.is_empty() {
            return Err(PlugError::DecodingError("empty firmware version".to_string()));
        }

        let mut parts: Vec<&str> = trimmed.split('.').collect();
        while parts.len() < 3 {
            parts.push("0");
        }

        Version::parse(&parts.join("."))
            .map(Self)
            .map_err(|e| PlugError::DecodingError(format!("invalid firmware version '{}': {}", s, e)))
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_version_strings() {
        let v: FirmwareVersion = "v7.2.4".parse().unwrap();
        assert_eq!(v, FirmwareVersion::new(7, 2, 4));
        assert_eq!(v.major(), 7);
        assert_eq!(v.to_string(), "v7.2.4");

        let short: FirmwareVersion = "6.4".parse().unwrap();
        assert_eq!(short, FirmwareVersion::new(6, 4, 0));

        let major_only: FirmwareVersion = "V7".parse().unwrap();
        assert_eq!(major_only, FirmwareVersion::new(7, 0, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<FirmwareVersion>().is_err());
        assert!("v7.x".parse::<FirmwareVersion>().is_err());
        assert!("7.2.4.1".parse::<FirmwareVersion>().is_err());
    }

    #[test]
    fn orders_by_component() {
        assert!(FirmwareVersion::new(7, 0, 12) < FirmwareVersion::new(7, 2, 0));
        assert!(FirmwareVersion::new(6, 4, 15) < FirmwareVersion::new(7, 0, 0));
        assert!("v7.0.10".parse::<FirmwareVersion>().unwrap() > FirmwareVersion::new(7, 0, 9));
    }
}
