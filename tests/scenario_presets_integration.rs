use std::process::Command;

#[derive(Debug)]
struct Report {
    cost_saved_percent: f64,
    solar_utilization: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_outcomes() {
    let default = run_and_parse_report(&["--scenario", "scenarios/default.toml"]);
    let heavy = run_and_parse_report(&["--scenario", "scenarios/heavy_evening.toml"]);
    let winter = run_and_parse_report(&["--scenario", "scenarios/derc_winter.toml"]);

    assert!(
        default.cost_saved_percent > 0.0,
        "expected default scenario to save cost: {default:?}"
    );
    assert!(
        (default.solar_utilization - winter.solar_utilization).abs() > 10.0,
        "expected sunny and cloudy utilization to differ: default={:.1}, winter={:.1}",
        default.solar_utilization,
        winter.solar_utilization
    );
    assert!(
        (default.cost_saved_percent - heavy.cost_saved_percent).abs() > 0.1,
        "expected default and heavy_evening savings to differ: default={:.1}, heavy={:.1}",
        default.cost_saved_percent,
        heavy.cost_saved_percent
    );
}

#[test]
fn default_scenario_file_matches_builtin_defaults() {
    let file = run_and_parse_report(&["--scenario", "scenarios/default.toml"]);
    let builtin = run_and_parse_report(&[]);
    assert_eq!(file.cost_saved_percent, builtin.cost_saved_percent);
    assert_eq!(file.solar_utilization, builtin.solar_utilization);
}

#[test]
fn json_output_carries_summary_fields() {
    let stdout = run_ok(&["--preset", "empty_at_peak", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    assert_eq!(value["flags"]["battery_empty_during_peak"], true);
    assert!(value["metrics"]["eco_score"].is_number());
    assert_eq!(value["smart"]["records"].as_array().map(Vec::len), Some(24));
}

#[test]
fn ledger_out_writes_both_strategies() {
    let path = std::env::temp_dir().join(format!("microgrid-ledger-{}.csv", std::process::id()));
    let path_str = path.to_string_lossy().to_string();
    run_ok(&["--preset", "default", "--ledger-out", &path_str]);

    let mut rdr = csv::Reader::from_path(&path).expect("ledger should exist");
    let strategies: Vec<String> = rdr
        .records()
        .map(|r| r.expect("row should parse")[0].to_string())
        .collect();
    std::fs::remove_file(&path).ok();

    assert_eq!(strategies.len(), 48);
    assert_eq!(strategies.iter().filter(|s| *s == "baseline").count(), 24);
    assert_eq!(strategies.iter().filter(|s| *s == "smart").count(), 24);
}

#[test]
fn print_defaults_round_trips_through_scenario_parser() {
    let stdout = run_ok(&["--print-defaults"]);
    let parsed = microgrid_sim::config::ScenarioConfig::from_toml_str(&stdout)
        .expect("printed defaults should parse");
    assert_eq!(parsed.battery.capacity_kwh, 10.0);
    assert_eq!(parsed.tariff.peak_price, 8.5);
}

#[test]
fn invalid_input_exits_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--preset", "no_such_preset"])
        .output()
        .expect("microgrid-sim process should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("preset"), "stderr={stderr}");

    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--scenario", "a.toml", "--preset", "default"])
        .output()
        .expect("microgrid-sim process should run");
    assert!(!output.status.success());
}

fn run_ok(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("microgrid-sim process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn run_and_parse_report(args: &[&str]) -> Report {
    parse_report(&run_ok(args))
}

fn parse_report(stdout: &str) -> Report {
    Report {
        cost_saved_percent: parse_percent(stdout, "Cost saved:"),
        solar_utilization: parse_percent(stdout, "Solar utilization:"),
    }
}

fn parse_percent(stdout: &str, label: &str) -> f64 {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .map(|rest| rest.trim().trim_end_matches('%'))
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("missing \"{label}\" line in output:\n{stdout}"))
}
