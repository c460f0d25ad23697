//! Offshore wind appraisal entry point: CLI wiring and config-driven runs.

use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

use owf_appraisal::config::ScenarioConfig;
use owf_appraisal::io::export::{export_cashflow_csv, export_ledger_csv};
use owf_appraisal::runner::{Project, run_monte_carlo};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    runs_override: Option<usize>,
    prices: Option<String>,
    ledger_out: Option<String>,
    cashflow_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("owf-appraisal: techno-economic appraisal of offshore wind farms");
    eprintln!();
    eprintln!("Usage: owf-appraisal [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --runs <usize>           Override number of Monte Carlo runs");
    eprintln!("  --prices <path>          Market price CSV (timestamp,price)");
    eprintln!("  --ledger-out <path>      Export discounted cost ledger to CSV");
    eprintln!("  --cashflow-out <path>    Export support-scheme cashflows to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the runs");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}

/// Returns the value following a flag or exits with an error.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v.as_str(),
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
        seed_override: None,
        runs_override: None,
        prices: None,
        ledger_out: None,
        cashflow_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
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
                cli.scenario_path = Some(flag_value(&args, i, "--scenario", "path").to_string());
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(flag_value(&args, i, "--preset", "name").to_string());
            }
            "--seed" => {
                i += 1;
                let v = flag_value(&args, i, "--seed", "u64");
                if let Ok(s) = v.parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{v}\" is not a valid u64");
                    process::exit(1);
                }
            }
            "--runs" => {
                i += 1;
                let v = flag_value(&args, i, "--runs", "usize");
                if let Ok(n) = v.parse::<usize>() {
                    cli.runs_override = Some(n);
                } else {
                    eprintln!("error: --runs value \"{v}\" is not a valid usize");
                    process::exit(1);
                }
            }
            "--prices" => {
                i += 1;
                cli.prices = Some(flag_value(&args, i, "--prices", "path").to_string());
            }
            "--ledger-out" => {
                i += 1;
                cli.ledger_out = Some(flag_value(&args, i, "--ledger-out", "path").to_string());
            }
            "--cashflow-out" => {
                i += 1;
                cli.cashflow_out =
                    Some(flag_value(&args, i, "--cashflow-out", "path").to_string());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let v = flag_value(&args, i, "--port", "u16");
                if let Ok(p) = v.parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{v}\" is not a valid u16");
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(runs) = cli.runs_override {
        scenario.simulation.runs = runs;
    }
    if let Some(ref path) = cli.prices {
        scenario.market.prices = Some(PathBuf::from(path));
    }

    // Validation happens inside Project::new and is reported as one error
    let project = match Project::new(scenario) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let report = match project.run(0) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    println!("{report}");

    let runs = project.config().simulation.runs;
    let summary = if runs > 1 {
        match run_monte_carlo(&project, runs) {
            Ok(s) => {
                println!("\n{s}");
                Some(s)
            }
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        }
    } else {
        None
    };

    if let Some(ref path) = cli.ledger_out {
        if let Err(e) = export_ledger_csv(&report.ledger, Path::new(path)) {
            eprintln!("error: failed to write ledger CSV: {e}");
            process::exit(1);
        }
        eprintln!("Ledger written to {path}");
    }

    if let Some(ref path) = cli.cashflow_out {
        match &report.cashflows {
            Some(series) => {
                if let Err(e) = export_cashflow_csv(series, Path::new(path)) {
                    eprintln!("error: failed to write cashflow CSV: {e}");
                    process::exit(1);
                }
                eprintln!("Cashflows written to {path}");
            }
            None => eprintln!("warning: no market prices, {path} not written"),
        }
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(owf_appraisal::api::AppState { report, summary });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        if let Err(e) = rt.block_on(owf_appraisal::api::serve(state, addr)) {
            eprintln!("error: API server failed: {e}");
            process::exit(1);
        }
    }
    #[cfg(not(feature = "api"))]
    let _ = summary;
}
