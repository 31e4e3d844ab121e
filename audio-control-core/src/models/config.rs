use serde::{Deserialize, Serialize};

use super::error::ControlError;
use super::property::Element;

/// Where a failed volume/mute fan-out is retried.
///
/// Some aggregate and virtual devices only expose the controllable property
/// on a single element even though discovery reported a different set (or
/// none). The retry happens once, after the whole fan-out has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFallback {
    Disabled,
    Element(Element),
}

impl Default for ChannelFallback {
    fn default() -> Self {
        Self::Element(0)
    }
}

/// Configuration for a device session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Missing channels tolerated by discovery before it stops probing (default: 3).
    pub max_consecutive_failures: u32,

    /// Retry target for failed volume/mute fan-outs (default: element 0).
    pub fallback: ChannelFallback,
}

impl SessionConfiguration {
    pub fn validate(&self) -> Result<(), ControlError> {
        if self.max_consecutive_failures == 0 {
            return Err(ControlError::InvalidConfiguration(
                "max_consecutive_failures must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ControlError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            ControlError::InvalidConfiguration(format!("failed to parse configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 3,
            fallback: ChannelFallback::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_probe_three_misses_and_fall_back_to_channel_zero() {
        let config = SessionConfiguration::default();
        assert_eq!(config.max_consecutive_failures, 3);
        assert_eq!(config.fallback, ChannelFallback::Element(0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_failure_budget_is_rejected() {
        let config = SessionConfiguration {
            max_consecutive_failures: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ControlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn parses_partial_json() {
        let config = SessionConfiguration::from_json(r#"{"fallback":"disabled"}"#).unwrap();
        assert_eq!(config.fallback, ChannelFallback::Disabled);
        assert_eq!(config.max_consecutive_failures, 3);

        let config =
            SessionConfiguration::from_json(r#"{"max_consecutive_failures":5,"fallback":{"element":1}}"#)
                .unwrap();
        assert_eq!(config.max_consecutive_failures, 5);
        assert_eq!(config.fallback, ChannelFallback::Element(1));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(SessionConfiguration::from_json("{").is_err());
        assert!(SessionConfiguration::from_json(r#"{"max_consecutive_failures":0}"#).is_err());
    }
}
