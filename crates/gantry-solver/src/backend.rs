//! QP backend registry.
//!
//! One backend ships today; the registry exists so callers select it by
//! name (e.g. from a CLI flag or config file) the same way they would pick
//! among several.

use std::fmt;
use std::str::FromStr;

use gantry_core::ConfigError;

/// Available quadratic-program backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Pure-Rust interior-point solver.
    #[default]
    Clarabel,
}

/// Backends compiled into this build, preference order first.
#[must_use]
pub const fn available_backends() -> &'static [Backend] {
    &[Backend::Clarabel]
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clarabel => write!(f, "clarabel"),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clarabel" => Ok(Self::Clarabel),
            other => Err(ConfigError::UnknownBackend(other.into())),
        }
    }
}
