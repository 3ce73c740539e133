//! Loader configuration
//!
//! Which engine version the loader claims to be, checked against a map's
//! minimum engine version, and which attachment kinds it can instantiate.
//!
//! # Example
//!
//! ```
//! use conquest_script::{EngineVersion, LoaderConfig};
//!
//! let config = LoaderConfig::default().with_engine_version(EngineVersion::new(2, 6, 0));
//! assert!(config.engine_version.is_compatible_with(&"2.5".parse().unwrap()));
//! assert!(!config.engine_version.is_compatible_with(&"3.0".parse().unwrap()));
//! ```

use conquest_core::AttachmentRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.point` version number
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub point: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32, point: u32) -> Self {
        Self {
            major,
            minor,
            point,
        }
    }

    /// The version of this crate.
    pub fn current() -> Self {
        env!("CARGO_PKG_VERSION").parse().unwrap_or_default()
    }

    /// Whether an engine of this version can load a map requiring `minimum`.
    pub fn is_compatible_with(&self, minimum: &EngineVersion) -> bool {
        self >= minimum
    }
}

impl FromStr for EngineVersion {
    type Err = String;

    /// Missing trailing parts are zero, so `2.6` is `2.6.0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(format!("invalid version '{}'", s));
        }
        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid version '{}'", s))?;
        }
        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.point)
    }
}

/// Configuration for [`Loader`](crate::Loader)
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Version compared against the map's minimum engine version.
    pub engine_version: EngineVersion,
    /// Constructors for the attachment kinds a map may name.
    pub registry: AttachmentRegistry,
}

impl LoaderConfig {
    pub fn with_engine_version(mut self, engine_version: EngineVersion) -> Self {
        self.engine_version = engine_version;
        self
    }

    pub fn with_registry(mut self, registry: AttachmentRegistry) -> Self {
        self.registry = registry;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            engine_version: EngineVersion::current(),
            registry: AttachmentRegistry::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!("2.6.14".parse::<EngineVersion>(), Ok(EngineVersion::new(2, 6, 14)));
        assert_eq!("2".parse::<EngineVersion>(), Ok(EngineVersion::new(2, 0, 0)));
        assert!("2.x".parse::<EngineVersion>().is_err());
        assert!("1.2.3.4".parse::<EngineVersion>().is_err());
        assert_eq!(EngineVersion::new(1, 9, 0).to_string(), "1.9.0");
    }

    #[test]
    fn test_compatibility_orders_by_part() {
        let engine = EngineVersion::new(2, 6, 0);
        assert!(engine.is_compatible_with(&EngineVersion::new(2, 6, 0)));
        assert!(engine.is_compatible_with(&EngineVersion::new(1, 99, 99)));
        assert!(!engine.is_compatible_with(&EngineVersion::new(2, 10, 0)));
    }

    #[test]
    fn test_current_matches_crate() {
        assert_eq!(
            EngineVersion::current().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }
}
