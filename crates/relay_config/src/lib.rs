//! Parsing and validation of `relay.toml` bench configuration files.
//!
//! This crate reads the bench configuration and produces a strongly-typed
//! [`RelayConfig`]. Named scenarios are merged with the global adder settings
//! by [`resolve_scenario`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_scenario, Operands, ResolvedScenario};
pub use types::*;
