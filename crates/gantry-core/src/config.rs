use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_frequency() -> f64 {
    200.0
}
const fn default_damping() -> f64 {
    1e-12
}
const fn default_true() -> bool {
    true
}
fn default_backend() -> String {
    "clarabel".into()
}

// ---------------------------------------------------------------------------
// ControlConfig
// ---------------------------------------------------------------------------

/// Control-loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Control rate in Hz (default: 200).
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// QP backend name (default: "clarabel").
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Tikhonov damping added to the QP objective diagonal (default: 1e-12).
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Enforce the model's joint velocity limits as QP box constraints
    /// (default: true).
    #[serde(default = "default_true")]
    pub velocity_limits: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
            backend: default_backend(),
            damping: default_damping(),
            velocity_limits: true,
        }
    }
}

impl ControlConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ConfigError::InvalidFrequency(self.frequency));
        }
        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(ConfigError::InvalidDamping(self.damping));
        }
        Ok(())
    }

    /// Control period in seconds.
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_config_is_valid() {
        let config = ControlConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.frequency, 200.0);
        assert_eq!(config.backend, "clarabel");
        assert!(config.velocity_limits);
    }

    #[test]
    fn period_is_inverse_frequency() {
        let config = ControlConfig {
            frequency: 500.0,
            ..ControlConfig::default()
        };
        assert_relative_eq!(config.period(), 0.002);
    }

    #[test]
    fn zero_frequency_rejected() {
        let config = ControlConfig {
            frequency: 0.0,
            ..ControlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn negative_damping_rejected() {
        let config = ControlConfig {
            damping: -1e-6,
            ..ControlConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDamping(_))
        ));
    }

    #[test]
    fn toml_with_partial_fields_uses_defaults() {
        let config: ControlConfig = toml::from_str("frequency = 100.0").unwrap();
        assert_relative_eq!(config.frequency, 100.0);
        assert_eq!(config.backend, "clarabel");
        assert_relative_eq!(config.damping, 1e-12);
    }

    #[test]
    fn toml_roundtrip() {
        let config = ControlConfig {
            frequency: 120.0,
            backend: "clarabel".into(),
            damping: 1e-9,
            velocity_limits: false,
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: ControlConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
