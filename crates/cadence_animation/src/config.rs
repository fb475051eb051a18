//! Playback configuration
//!
//! Playback flags can be set one by one on an [`Animation`](crate::Animation)
//! or loaded as a whole from TOML:
//!
//! ```toml
//! locking_ui = true
//! bring_to_front = true
//! time_scale = 0.5
//! ```

use crate::error::{AnimationError, Result};
use serde::{Deserialize, Serialize};

/// Playback options of an animation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Hold the host's interaction lock while playing
    pub locking_ui: bool,
    /// Raise each step's objects above their siblings before the step plays
    pub bring_to_front: bool,
    /// Multiplier applied to tick deltas (1.0 = real time)
    pub time_scale: f32,
}

impl PlaybackConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_time_scale(self.time_scale)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            locking_ui: false,
            bring_to_front: false,
            time_scale: 1.0,
        }
    }
}

pub(crate) fn validate_time_scale(time_scale: f32) -> Result<()> {
    if time_scale.is_finite() && time_scale > 0.0 {
        Ok(())
    } else {
        Err(AnimationError::InvalidTimeScale(time_scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = PlaybackConfig::from_toml_str("bring_to_front = true").unwrap();

        assert!(config.bring_to_front);
        assert!(!config.locking_ui);
        assert_eq!(config.time_scale, 1.0);
    }

    #[test]
    fn test_full_document() {
        let config = PlaybackConfig::from_toml_str(
            "locking_ui = true\nbring_to_front = false\ntime_scale = 0.5\n",
        )
        .unwrap();

        assert_eq!(
            config,
            PlaybackConfig {
                locking_ui: true,
                bring_to_front: false,
                time_scale: 0.5,
            }
        );
    }

    #[test]
    fn test_rejects_bad_time_scale() {
        let result = PlaybackConfig::from_toml_str("time_scale = 0.0");
        assert!(matches!(result, Err(AnimationError::InvalidTimeScale(_))));

        let result = PlaybackConfig::from_toml_str("time_scale = -2.0");
        assert!(matches!(result, Err(AnimationError::InvalidTimeScale(_))));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = PlaybackConfig::from_toml_str("locking_ui = \"yes\"");
        assert!(matches!(result, Err(AnimationError::Config(_))));
    }
}
