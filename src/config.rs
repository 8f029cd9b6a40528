//! Collector configuration
//!
//! Two tunables: how aggressively the tracked set is compacted, and how
//! many allocations are allowed between opportunistic collections. Both
//! can be overridden from the environment.

use crate::logging::warn;

/// Fraction of dead observers that triggers compaction after a sweep.
pub const DEFAULT_ORGANIZATION_THRESHOLD: f64 = 0.5;

/// Allocations between opportunistic collections (Python's default).
pub const DEFAULT_COLLECTION_THRESHOLD: usize = 700;

/// Tunables for one collector instance.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Ratio in [0, 1]: when the fraction of dead observers in the tracked
    /// set exceeds it after a sweep, the set is compacted. 1.0 disables
    /// compaction; 0.0 compacts whenever any dead observer exists.
    pub organization_threshold: f64,

    /// Number of allocations after which `maybe_collect` runs a cycle.
    pub collection_threshold: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            organization_threshold: DEFAULT_ORGANIZATION_THRESHOLD,
            collection_threshold: DEFAULT_COLLECTION_THRESHOLD,
        }
    }
}

impl CollectorConfig {
    /// Create config from environment variables.
    ///
    /// `CYCLERC_ORGANIZATION_THRESHOLD` and `CYCLERC_COLLECTION_THRESHOLD`;
    /// unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("CYCLERC_ORGANIZATION_THRESHOLD") {
            match raw.parse::<f64>() {
                Ok(value) => config.organization_threshold = value,
                Err(_) => warn!(raw = %raw, "unparseable organization threshold, keeping default"),
            }
        }

        if let Ok(raw) = std::env::var("CYCLERC_COLLECTION_THRESHOLD") {
            match raw.parse::<usize>() {
                Ok(value) => config.collection_threshold = value,
                Err(_) => warn!(raw = %raw, "unparseable collection threshold, keeping default"),
            }
        }

        config.validated()
    }

    /// Clamp out-of-range values back into their domain.
    pub fn validated(mut self) -> Self {
        if !self.organization_threshold.is_finite() {
            warn!(
                threshold = self.organization_threshold,
                "non-finite organization threshold, using default"
            );
            self.organization_threshold = DEFAULT_ORGANIZATION_THRESHOLD;
        } else if !(0.0..=1.0).contains(&self.organization_threshold) {
            warn!(
                threshold = self.organization_threshold,
                "organization threshold outside [0, 1], clamping"
            );
            self.organization_threshold = self.organization_threshold.clamp(0.0, 1.0);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.organization_threshold, DEFAULT_ORGANIZATION_THRESHOLD);
        assert_eq!(config.collection_threshold, DEFAULT_COLLECTION_THRESHOLD);
    }

    #[test]
    fn validation_clamps_threshold() {
        let config = CollectorConfig {
            organization_threshold: 1.5,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.organization_threshold, 1.0);

        let config = CollectorConfig {
            organization_threshold: -0.25,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.organization_threshold, 0.0);
    }

    #[test]
    fn validation_replaces_non_finite_threshold() {
        let config = CollectorConfig {
            organization_threshold: f64::NAN,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.organization_threshold, DEFAULT_ORGANIZATION_THRESHOLD);
    }
}
