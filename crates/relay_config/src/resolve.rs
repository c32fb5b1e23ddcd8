//! Scenario resolution: merging per-scenario settings with the global ones.

use crate::error::ConfigError;
use crate::types::RelayConfig;

/// Where a scenario's operands come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operands {
    /// Listed in the configuration.
    Explicit {
        /// Values for stream `a`.
        a: Vec<i128>,
        /// Values for stream `b`.
        b: Vec<i128>,
        /// Expected results, if given.
        expected: Option<Vec<i128>>,
    },
    /// Generated from a seed.
    Random {
        /// Number of operand pairs.
        count: usize,
        /// Generator seed.
        seed: u64,
    },
}

/// A scenario with every default filled in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedScenario {
    /// The scenario name.
    pub name: String,
    /// Operand width: the scenario override or `adder.width`.
    pub width: u32,
    /// Rising edges of reset before the transfer.
    pub reset_cycles: u64,
    /// Clock period string from `[clock]`.
    pub period: String,
    /// The operands to send.
    pub operands: Operands,
}

impl ResolvedScenario {
    /// Number of operand pairs this scenario sends.
    pub fn len(&self) -> usize {
        match &self.operands {
            Operands::Explicit { a, .. } => a.len(),
            Operands::Random { count, .. } => *count,
        }
    }

    /// Returns true if the scenario sends nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Looks up a scenario by name and applies the global defaults.
pub fn resolve_scenario(config: &RelayConfig, name: &str) -> Result<ResolvedScenario, ConfigError> {
    let def = config
        .scenarios
        .get(name)
        .ok_or_else(|| ConfigError::UnknownScenario(name.to_string()))?;

    let widen = |values: &[i64]| values.iter().map(|&v| i128::from(v)).collect::<Vec<_>>();
    let operands = match def.random {
        Some(count) => Operands::Random {
            count,
            seed: def.seed,
        },
        None => Operands::Explicit {
            a: widen(&def.a),
            b: widen(&def.b),
            expected: def.expected.as_deref().map(widen),
        },
    };

    Ok(ResolvedScenario {
        name: name.to_string(),
        width: def.width.unwrap_or(config.adder.width),
        reset_cycles: config.adder.reset_cycles,
        period: config.clock.period.clone(),
        operands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const TOML: &str = r#"
[project]
name = "adder"

[clock]
period = "20ns"

[adder]
width = 6
reset_cycles = 1

[scenarios.basic]
a = [3, -2]
b = [2, 3]

[scenarios.checked]
a = [1]
b = [1]
expected = [2]
width = 4

[scenarios.burst]
random = 50
seed = 9
"#;

    #[test]
    fn explicit_scenario_inherits_globals() {
        let config = load_config_from_str(TOML).unwrap();
        let s = resolve_scenario(&config, "basic").unwrap();
        assert_eq!(s.width, 6);
        assert_eq!(s.reset_cycles, 1);
        assert_eq!(s.period, "20ns");
        assert_eq!(
            s.operands,
            Operands::Explicit {
                a: vec![3, -2],
                b: vec![2, 3],
                expected: None
            }
        );
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn width_override_wins() {
        let config = load_config_from_str(TOML).unwrap();
        let s = resolve_scenario(&config, "checked").unwrap();
        assert_eq!(s.width, 4);
        assert!(matches!(
            s.operands,
            Operands::Explicit { expected: Some(ref e), .. } if e == &vec![2]
        ));
    }

    #[test]
    fn random_scenario() {
        let config = load_config_from_str(TOML).unwrap();
        let s = resolve_scenario(&config, "burst").unwrap();
        assert_eq!(s.operands, Operands::Random { count: 50, seed: 9 });
        assert_eq!(s.len(), 50);
        assert!(!s.is_empty());
    }

    #[test]
    fn unknown_scenario_errors() {
        let config = load_config_from_str(TOML).unwrap();
        let err = resolve_scenario(&config, "missing").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownScenario(ref n) if n == "missing"));
    }
}
