//! `relay run`: execute configured scenarios.
//!
//! Each selected scenario runs on a fresh bench: reset, transfer, compare.
//! Prints per-scenario pass/fail status and a summary line.

use std::path::Path;

use relay_config::{resolve_scenario, RelayConfig};
use relay_sim::{run_scenario, SimTime};

use crate::project::{bench_options, build_scenario, resolve_project_root};
use crate::{GlobalArgs, RunArgs};

/// Result of running a single scenario.
struct ScenarioResult {
    name: String,
    passed: bool,
    cycles: u64,
    end_time: SimTime,
    error: Option<String>,
}

/// Runs the `relay run` command.
///
/// Returns exit code 0 if every selected scenario passes, 1 otherwise.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = relay_config::load_config(&project_dir)?;

    if !global.quiet {
        eprintln!("   Running {}", config.project.name);
    }

    if let Some(ref name) = args.name {
        if !config.scenarios.contains_key(name) {
            return Err(relay_config::ConfigError::UnknownScenario(name.clone()).into());
        }
    }

    let names = select_scenarios(&config, args.name.as_deref(), args.filter.as_deref());
    if names.is_empty() {
        if !global.quiet {
            eprintln!("warning: no scenarios match");
        }
        return Ok(0);
    }

    let waveform_dir = if config.waveform.enabled && !args.no_waveform {
        let dir = project_dir.join(&config.waveform.dir);
        std::fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };

    let mut results = Vec::new();
    for name in &names {
        let result = run_single_scenario(&config, name, waveform_dir.as_deref());
        if !global.quiet {
            print_result(&result);
        }
        results.push(result);
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if !global.quiet {
        eprintln!();
        eprintln!(
            "   Result: {passed} passed, {failed} failed out of {} scenario(s)",
            results.len()
        );
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

/// Picks scenario names by exact name or substring filter; all if neither.
fn select_scenarios(config: &RelayConfig, name: Option<&str>, filter: Option<&str>) -> Vec<String> {
    config
        .scenarios
        .keys()
        .filter(|key| match (name, filter) {
            (Some(n), _) => key.as_str() == n,
            (None, Some(f)) => key.contains(f),
            (None, None) => true,
        })
        .cloned()
        .collect()
}

fn run_single_scenario(config: &RelayConfig, name: &str, waveform_dir: Option<&Path>) -> ScenarioResult {
    let outcome = resolve_scenario(config, name)
        .map_err(|e| e.to_string())
        .and_then(|resolved| {
            let scenario = build_scenario(&resolved).map_err(|e| e.to_string())?;
            let options = bench_options(&resolved, waveform_dir).map_err(|e| e.to_string())?;
            run_scenario(&scenario, &options).map_err(|e| e.to_string())
        });

    match outcome {
        Ok(report) => ScenarioResult {
            name: name.to_string(),
            passed: true,
            cycles: report.cycles,
            end_time: report.end_time,
            error: None,
        },
        Err(error) => {
            log::debug!("scenario '{name}' failed: {error}");
            ScenarioResult {
                name: name.to_string(),
                passed: false,
                cycles: 0,
                end_time: SimTime::default(),
                error: Some(error),
            }
        }
    }
}

fn print_result(result: &ScenarioResult) {
    if result.passed {
        eprintln!(
            "   PASS  {name} ({cycles} cycles, {time})",
            name = result.name,
            cycles = result.cycles,
            time = result.end_time,
        );
    } else {
        eprintln!(
            "   FAIL  {name}: {err}",
            name = result.name,
            err = result.error.as_deref().unwrap_or("unknown error"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[project]
name = "bench"

[scenarios.basic]
a = [3, -2, 3, -2]
b = [2, 3, -4, -2]
expected = [5, 1, -1, -4]

[scenarios.basic_wrong]
a = [1]
b = [1]
expected = [3]

[scenarios.burst]
random = 20
seed = 3
width = 8
"#;

    fn project(config: &str) -> (TempDir, GlobalArgs) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("relay.toml"), config).unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().to_str().unwrap().to_string()),
        };
        (tmp, global)
    }

    fn args(name: Option<&str>, filter: Option<&str>) -> RunArgs {
        RunArgs {
            name: name.map(str::to_string),
            filter: filter.map(str::to_string),
            no_waveform: false,
        }
    }

    #[test]
    fn select_by_name_and_filter() {
        let config = relay_config::load_config_from_str(CONFIG).unwrap();
        assert_eq!(select_scenarios(&config, None, None).len(), 3);
        assert_eq!(select_scenarios(&config, Some("basic"), None), vec!["basic"]);
        assert_eq!(
            select_scenarios(&config, None, Some("basic")),
            vec!["basic", "basic_wrong"]
        );
        assert!(select_scenarios(&config, None, Some("zzz")).is_empty());
    }

    #[test]
    fn passing_scenarios_exit_zero() {
        let (_tmp, global) = project(CONFIG);
        assert_eq!(run(&args(Some("basic"), None), &global).unwrap(), 0);
        assert_eq!(run(&args(Some("burst"), None), &global).unwrap(), 0);
    }

    #[test]
    fn failing_scenario_exits_one() {
        let (_tmp, global) = project(CONFIG);
        assert_eq!(run(&args(None, None), &global).unwrap(), 1);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let (_tmp, global) = project(CONFIG);
        let err = run(&args(Some("nope"), None), &global).unwrap_err();
        assert_eq!(err.to_string(), "unknown scenario 'nope'");
    }

    #[test]
    fn waveforms_written_when_enabled() {
        let config = format!("{CONFIG}\n[waveform]\nenabled = true\ndir = \"traces\"\n");
        let (tmp, global) = project(&config);
        run(&args(Some("basic"), None), &global).unwrap();
        let vcd = fs::read_to_string(tmp.path().join("traces/basic.vcd")).unwrap();
        assert!(vcd.contains("$enddefinitions $end"));
    }

    #[test]
    fn no_waveform_flag_wins() {
        let config = format!("{CONFIG}\n[waveform]\nenabled = true\n");
        let (tmp, global) = project(&config);
        let mut a = args(Some("basic"), None);
        a.no_waveform = true;
        run(&a, &global).unwrap();
        assert!(!tmp.path().join("out").exists());
    }
}
