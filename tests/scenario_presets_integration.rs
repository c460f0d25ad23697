use std::process::{Command, Output};

#[derive(Debug)]
struct Figures {
    capex_nominal: f64,
    npv: Option<f64>,
}

#[test]
fn presets_run_via_cli_and_differ_in_capex_risk() {
    let baseline = run_and_parse(&["--preset", "baseline"]);
    let risk = run_and_parse(&["--preset", "commodity_risk", "--runs", "1"]);

    assert!(baseline.npv.is_none(), "no prices given, valuation expected to be skipped");
    assert!(
        (baseline.capex_nominal - risk.capex_nominal).abs() > 1.0,
        "expected stochastic commodity prices to move CAPEX: baseline={:.2}, risk={:.2}",
        baseline.capex_nominal,
        risk.capex_nominal
    );
}

#[test]
fn seed_override_changes_stochastic_capex() {
    let a = run_and_parse(&["--preset", "commodity_risk", "--runs", "1", "--seed", "1"]);
    let b = run_and_parse(&["--preset", "commodity_risk", "--runs", "1", "--seed", "2"]);
    let again = run_and_parse(&["--preset", "commodity_risk", "--runs", "1", "--seed", "1"]);
    assert_ne!(a.capex_nominal, b.capex_nominal);
    assert_eq!(a.capex_nominal, again.capex_nominal);
}

#[test]
fn scenario_file_with_prices_is_valued() {
    let output = run(&["--scenario", "scenarios/offshore_cfd.toml"]);
    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    let figures = parse_figures(&stdout);
    assert!(figures.npv.is_some(), "expected an NPV line in output: {stdout}");
    assert!(stdout.contains("--- Monte Carlo Summary (10 runs) ---"));
}

#[test]
fn unknown_preset_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_owf-appraisal"))
        .args(["--preset", "onshore"])
        .output()
        .expect("owf-appraisal process should run");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown preset"));
}

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_owf-appraisal"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("owf-appraisal process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn run_and_parse(args: &[&str]) -> Figures {
    let stdout = String::from_utf8(run(args).stdout).expect("stdout should be valid UTF-8");
    parse_figures(&stdout)
}

fn parse_figures(stdout: &str) -> Figures {
    Figures {
        capex_nominal: parse_metric(stdout, "CAPEX nominal:")
            .unwrap_or_else(|| panic!("missing CAPEX line in output: {stdout}")),
        npv: parse_metric(stdout, "NPV:"),
    }
}

fn parse_metric(stdout: &str, label: &str) -> Option<f64> {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))?;

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid format for line `{line}`"));

    Some(
        raw.parse::<f64>()
            .unwrap_or_else(|_| panic!("failed parsing `{raw}` from line `{line}`")),
    )
}
