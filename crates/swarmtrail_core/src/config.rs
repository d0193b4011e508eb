//! Configuration management for the trajectory recorder.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every section has defaults, so a partial file (or
//! none at all) is valid.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults)
//! 3. Run metadata supplied by the host at run start (for `[metadata]` only)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [sampling]
//! sample_hz = 30.0
//! record_every_nth = 1
//!
//! [grouping]
//! cluster_threshold = 5.0
//! min_group_size = 3
//!
//! [persistence]
//! root_dir = "Data/Trajectories"
//! autosave_interval_secs = 30.0
//! ```

use serde::{Deserialize, Serialize};
use swarmtrail_data::{RunMetadata, DEFAULT_PARTICIPANT_ID};

/// Sampling and recording rates.
///
/// `sample_hz <= 0` samples every tick. A positive `record_hz` throttles
/// recording by time; otherwise every `record_every_nth` sample is recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SamplingConfig {
    pub sample_hz: f64,
    pub record_hz: f64,
    pub record_every_nth: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_hz: 30.0,
            record_hz: 0.0,
            record_every_nth: 1,
        }
    }
}

/// Main-group classification policy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GroupingConfig {
    /// Link distance for the geometric fallback, in scene units.
    pub cluster_threshold: f32,
    /// Measure link distance in the XZ plane only.
    pub horizontal_only: bool,
    /// Below this many members no main group is asserted. `<= 1` disables the floor.
    pub min_group_size: usize,
    /// Until a connectivity source reports a group, treat every agent as grouped.
    pub assume_grouped_until_ready: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            cluster_threshold: 5.0,
            horizontal_only: true,
            min_group_size: 1,
            assume_grouped_until_ready: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub root_dir: String,
    /// Periodic save interval in run seconds. `<= 0` disables periodic saves.
    pub autosave_interval_secs: f64,
    /// Saves closer than this to the previous one are coalesced.
    pub debounce_ms: u64,
    pub save_on_exit: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            root_dir: "Data/Trajectories".to_string(),
            autosave_interval_secs: 30.0,
            debounce_ms: 250,
            save_on_exit: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Run seconds to wait before asking the provider again after a failed discovery.
    pub retry_interval_secs: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: 1.0,
        }
    }
}

/// Fallback run metadata used when the host supplies none.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MetadataConfig {
    pub participant_id: Option<String>,
    pub haptics: Option<bool>,
    pub ordered: Option<bool>,
    pub label: Option<String>,
}

impl MetadataConfig {
    #[must_use]
    pub fn to_run_metadata(&self) -> RunMetadata {
        RunMetadata {
            participant_id: self
                .participant_id
                .clone()
                .unwrap_or_else(|| DEFAULT_PARTICIPANT_ID.to_string()),
            haptics: self.haptics.unwrap_or(false),
            ordered: self.ordered.unwrap_or(false),
            label: self.label.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RecorderConfig {
    pub sampling: SamplingConfig,
    pub grouping: GroupingConfig,
    pub persistence: PersistenceConfig,
    pub discovery: DiscoveryConfig,
    pub metadata: MetadataConfig,
}

impl RecorderConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.sample_hz.is_finite(),
            "Sample rate must be finite"
        );
        anyhow::ensure!(
            self.sampling.record_hz.is_finite() && self.sampling.record_hz >= 0.0,
            "Record rate must be finite and non-negative"
        );
        anyhow::ensure!(
            self.sampling.record_every_nth >= 1,
            "record_every_nth must be at least 1"
        );

        anyhow::ensure!(
            self.grouping.cluster_threshold.is_finite() && self.grouping.cluster_threshold > 0.0,
            "Cluster threshold must be positive"
        );

        anyhow::ensure!(
            !self.persistence.root_dir.trim().is_empty(),
            "Persistence root directory must not be empty"
        );
        anyhow::ensure!(
            self.persistence.autosave_interval_secs.is_finite(),
            "Autosave interval must be finite"
        );
        anyhow::ensure!(
            self.persistence.debounce_ms <= 60_000,
            "Save debounce too large (max 60000 ms)"
        );

        anyhow::ensure!(
            self.discovery.retry_interval_secs.is_finite()
                && self.discovery.retry_interval_secs >= 0.0,
            "Discovery retry interval must be non-negative"
        );

        Ok(())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = RecorderConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RecorderConfig::from_toml(
            r#"
            [sampling]
            sample_hz = 10.0

            [grouping]
            min_group_size = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.sampling.sample_hz, 10.0);
        assert_eq!(config.sampling.record_every_nth, 1);
        assert_eq!(config.grouping.min_group_size, 4);
        assert_eq!(config.persistence.debounce_ms, 250);
    }

    #[test]
    fn test_zero_decimation_rejected() {
        let config = RecorderConfig {
            sampling: SamplingConfig {
                record_every_nth: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_record_rate_rejected() {
        let config = RecorderConfig {
            sampling: SamplingConfig {
                record_hz: -2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_threshold() {
        let config = RecorderConfig {
            grouping: GroupingConfig {
                cluster_threshold: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = RecorderConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(RecorderConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = MetadataConfig::default().to_run_metadata();
        assert_eq!(meta.participant_id, DEFAULT_PARTICIPANT_ID);
        assert!(!meta.haptics);
    }
}
