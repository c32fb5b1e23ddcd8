//! Configuration types deserialized from `relay.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level bench configuration parsed from `relay.toml`.
#[derive(Clone, Debug, Deserialize)]
pub struct RelayConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Clock settings.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Adder defaults shared by all scenarios.
    #[serde(default)]
    pub adder: AdderConfig,
    /// Trace output settings.
    #[serde(default)]
    pub waveform: WaveformConfig,
    /// Named scenarios, run in name order.
    #[serde(default)]
    pub scenarios: BTreeMap<String, ScenarioDef>,
}

/// Project metadata required in every `relay.toml`.
#[derive(Clone, Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// The `[clock]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Clock period as a duration string such as `"10ns"`.
    #[serde(default = "default_period")]
    pub period: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
        }
    }
}

fn default_period() -> String {
    "10ns".to_string()
}

/// The `[adder]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AdderConfig {
    /// Operand width in bits.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Rising edges to hold reset before each scenario.
    #[serde(default = "default_reset_cycles")]
    pub reset_cycles: u64,
}

impl Default for AdderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            reset_cycles: default_reset_cycles(),
        }
    }
}

fn default_width() -> u32 {
    4
}

fn default_reset_cycles() -> u64 {
    2
}

/// The `[waveform]` section.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct WaveformConfig {
    /// Whether to write one VCD file per scenario.
    #[serde(default)]
    pub enabled: bool,
    /// Output directory, relative to the project directory.
    #[serde(default = "default_waveform_dir")]
    pub dir: String,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_waveform_dir(),
        }
    }
}

fn default_waveform_dir() -> String {
    "out".to_string()
}

/// One `[scenarios.<name>]` table.
///
/// A scenario lists its operands explicitly (`a`, `b` and optionally
/// `expected`) or asks for `random` pairs generated from `seed`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ScenarioDef {
    /// Values for stream `a`.
    #[serde(default)]
    pub a: Vec<i64>,
    /// Values for stream `b`.
    #[serde(default)]
    pub b: Vec<i64>,
    /// Expected results. Defaults to the element-wise sums.
    #[serde(default)]
    pub expected: Option<Vec<i64>>,
    /// Number of random operand pairs to generate.
    #[serde(default)]
    pub random: Option<usize>,
    /// Seed for random generation.
    #[serde(default)]
    pub seed: u64,
    /// Operand width override.
    #[serde(default)]
    pub width: Option<u32>,
}
