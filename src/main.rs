//! Microgrid simulator entry point: CLI wiring, logging setup, and output.

use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::export_csv;
use microgrid_sim::run_scenario;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    json: bool,
    ledger_out: Option<String>,
    print_defaults: bool,
}

fn print_help() {
    eprintln!("microgrid-sim: solar + battery + grid day-ahead dispatch comparison");
    eprintln!();
    eprintln!("Usage: microgrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --json                   Print the full comparison as JSON");
    eprintln!("  --ledger-out <path>      Export both hourly ledgers to CSV");
    eprintln!("  --print-defaults         Print the default scenario as TOML and exit");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the default scenario is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

fn require_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    match args.get(i) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires a {what} argument");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        json: false,
        ledger_out: None,
        print_defaults: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                cli.scenario_path = Some(require_value(&args, i, "--scenario", "path"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(require_value(&args, i, "--preset", "name"));
            }
            "--ledger-out" => {
                i += 1;
                cli.ledger_out = Some(require_value(&args, i, "--ledger-out", "path"));
            }
            "--json" => cli.json = true,
            "--print-defaults" => cli.print_defaults = true,
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        eprintln!("error: --scenario and --preset are mutually exclusive");
        process::exit(1);
    }

    cli
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .without_time()
        .compact()
        .init();
}

fn main() {
    let cli = parse_args();
    init_logging();

    if cli.print_defaults {
        match ScenarioConfig::default().to_toml_string() {
            Ok(s) => print!("{s}"),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
        return;
    }

    let scenario = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(Path::new(path))
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)
    } else {
        Ok(ScenarioConfig::default())
    };

    let result = match scenario.and_then(|s| run_scenario(&s)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error: failed to serialize result: {e}");
                process::exit(1);
            }
        }
    } else {
        for run in [&result.baseline, &result.smart] {
            println!("=== {} ===", run.strategy);
            for r in &run.records {
                println!("{r}");
            }
            println!();
        }
        println!("{result}");
    }

    if let Some(ref path) = cli.ledger_out {
        if let Err(e) = export_csv(&result, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Ledger written to {path}");
    }
}
