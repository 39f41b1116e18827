use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid frequency: {0} (must be > 0)")]
    InvalidFrequency(f64),

    #[error("Invalid damping: {0} (must be >= 0)")]
    InvalidDamping(f64),

    #[error("Unknown QP backend: {0}")]
    UnknownBackend(String),
}
