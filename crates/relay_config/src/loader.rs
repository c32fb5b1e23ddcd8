//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{RelayConfig, ScenarioDef};
use relay_common::{signed_range, MAX_WIDTH};
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE: &str = "relay.toml";

// The result bus is one bit wider than the operands.
const MAX_ADDER_WIDTH: u32 = MAX_WIDTH - 1;

/// Loads and validates `relay.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<RelayConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Parses and validates a `relay.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RelayConfig, ConfigError> {
    let config: RelayConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RelayConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.clock.period.trim().is_empty() {
        return Err(ConfigError::MissingField("clock.period".to_string()));
    }
    check_width("adder.width", config.adder.width)?;
    for (name, scenario) in &config.scenarios {
        validate_scenario(name, scenario, config.adder.width)?;
    }
    Ok(())
}

fn check_width(field: &str, width: u32) -> Result<(), ConfigError> {
    if (1..=MAX_ADDER_WIDTH).contains(&width) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "{field} must be between 1 and {MAX_ADDER_WIDTH}, got {width}"
        )))
    }
}

fn validate_scenario(name: &str, def: &ScenarioDef, default_width: u32) -> Result<(), ConfigError> {
    let invalid = |msg: String| ConfigError::ValidationError(format!("scenario '{name}': {msg}"));

    let width = def.width.unwrap_or(default_width);
    check_width(&format!("scenarios.{name}.width"), width)?;

    if def.random.is_some() {
        if !def.a.is_empty() || !def.b.is_empty() || def.expected.is_some() {
            return Err(invalid(
                "`random` cannot be combined with `a`, `b` or `expected`".to_string(),
            ));
        }
        return Ok(());
    }

    if def.a.len() != def.b.len() {
        return Err(invalid(format!(
            "`a` has {} values but `b` has {}",
            def.a.len(),
            def.b.len()
        )));
    }
    if let Some(expected) = &def.expected {
        if expected.len() != def.a.len() {
            return Err(invalid(format!(
                "`expected` has {} values but there are {} operand pairs",
                expected.len(),
                def.a.len()
            )));
        }
    }

    let (lo, hi) = signed_range(width);
    if let Some(v) = def
        .a
        .iter()
        .chain(&def.b)
        .find(|&&v| !(lo..=hi).contains(&i128::from(v)))
    {
        return Err(invalid(format!(
            "value {v} does not fit in {width} signed bits"
        )));
    }
    Ok(())
}
