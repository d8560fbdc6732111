//! Configuration module
//!
//! Provides configuration management for the exporters: destination URLs,
//! metric export interval and request timeout, loaded from environment
//! variables, a YAML properties file, or the programmatic API.

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, Properties};
pub use types::{Config, ConfigBuilder, Signal};
