//! `relay list`: show configured scenarios.

use relay_config::{resolve_scenario, Operands, RelayConfig};

use crate::project::resolve_project_root;
use crate::GlobalArgs;

/// Runs the `relay list` command. Scenario lines go to stdout.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = relay_config::load_config(&project_dir)?;

    if !global.quiet {
        eprintln!(
            "   {} scenario(s) in {}",
            config.scenarios.len(),
            config.project.name
        );
    }
    for line in describe(&config)? {
        println!("{line}");
    }
    Ok(0)
}

fn describe(config: &RelayConfig) -> Result<Vec<String>, relay_config::ConfigError> {
    config
        .scenarios
        .keys()
        .map(|name| {
            let resolved = resolve_scenario(config, name)?;
            let source = match &resolved.operands {
                Operands::Explicit { .. } => "explicit".to_string(),
                Operands::Random { seed, .. } => format!("random, seed {seed}"),
            };
            Ok(format!(
                "{name}  width={}  pairs={}  ({source})",
                resolved.width,
                resolved.len()
            ))
        })
        .collect()
}
