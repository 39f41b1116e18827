// gantry-core: configuration, errors, and rate limiting for the gantry IK stack.

pub mod config;
pub mod error;
pub mod rate;

pub use config::ControlConfig;
pub use error::ConfigError;
pub use rate::RateLimiter;
