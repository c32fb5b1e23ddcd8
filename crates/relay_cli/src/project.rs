//! Project discovery and conversion of configured scenarios into bench runs.

use std::path::{Path, PathBuf};

use relay_config::{Operands, ResolvedScenario, CONFIG_FILE};
use relay_sim::{parse_duration, BenchOptions, Scenario, SimError};

use crate::GlobalArgs;

/// Walks up from `start` until a directory containing `relay.toml` is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project directory from `--config` (file or directory), or
/// by searching upward from the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                Ok(p.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(p)
            }
        }
        None => find_project_root(&std::env::current_dir()?),
    }
}

/// Builds the bench scenario for a resolved configuration entry.
pub fn build_scenario(resolved: &ResolvedScenario) -> Result<Scenario, SimError> {
    match &resolved.operands {
        Operands::Explicit { a, b, expected } => {
            let scenario = Scenario::new(&resolved.name, resolved.width, a.clone(), b.clone());
            Ok(match expected {
                Some(expected) => scenario.with_expected(expected.clone()),
                None => scenario,
            })
        }
        Operands::Random { count, seed } => {
            Scenario::random(&resolved.name, resolved.width, *count, *seed)
        }
    }
}

/// Builds run options, placing the trace at `<waveform_dir>/<name>.vcd` when
/// a directory is given.
pub fn bench_options(
    resolved: &ResolvedScenario,
    waveform_dir: Option<&Path>,
) -> Result<BenchOptions, SimError> {
    Ok(BenchOptions {
        period_fs: parse_duration(&resolved.period)?,
        reset_cycles: resolved.reset_cycles,
        waveform: waveform_dir.map(|dir| dir.join(format!("{}.vcd", resolved.name))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn resolved(operands: Operands) -> ResolvedScenario {
        ResolvedScenario {
            name: "basic".to_string(),
            width: 4,
            reset_cycles: 2,
            period: "10ns".to_string(),
            operands,
        }
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[project]\nname=\"t\"").unwrap();
        let sub = tmp.path().join("out");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find relay.toml"));
    }

    #[test]
    fn resolve_project_root_from_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[project]\nname=\"t\"").unwrap();
        let global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: Some(config_path.to_str().unwrap().to_string()),
        };
        assert_eq!(resolve_project_root(&global).unwrap(), tmp.path());
    }

    #[test]
    fn explicit_scenario_keeps_expected() {
        let s = build_scenario(&resolved(Operands::Explicit {
            a: vec![1, 2],
            b: vec![3, 4],
            expected: Some(vec![4, 7]),
        }))
        .unwrap();
        assert_eq!(s.expected, vec![4, 7]);
        assert_eq!(s.width, 4);
    }

    #[test]
    fn random_scenario_is_generated() {
        let s = build_scenario(&resolved(Operands::Random { count: 5, seed: 1 })).unwrap();
        assert_eq!(s.a.len(), 5);
        assert_eq!(s.expected.len(), 5);
    }

    #[test]
    fn options_parse_period_and_waveform_path() {
        let r = resolved(Operands::Random { count: 1, seed: 0 });
        let options = bench_options(&r, Some(Path::new("out"))).unwrap();
        assert_eq!(options.period_fs, 10_000_000);
        assert_eq!(options.reset_cycles, 2);
        assert_eq!(options.waveform, Some(PathBuf::from("out/basic.vcd")));
    }

    #[test]
    fn options_reject_bad_period() {
        let mut r = resolved(Operands::Random { count: 1, seed: 0 });
        r.period = "10 parsecs".to_string();
        assert!(matches!(
            bench_options(&r, None),
            Err(SimError::InvalidDuration { .. })
        ));
    }
}
