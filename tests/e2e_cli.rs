use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

mod cli_helpers;
use cli_helpers::{base_cmd, fixture, run_cmd_failing, run_cmd_json};

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

#[test]
fn value_from_saved_payload_prints_table_without_color() {
    let home = setup_temp_home();
    let payload = fixture("multi_symbol.json");

    let mut cmd = base_cmd(&home);
    cmd.args([
        "value",
        "--start",
        "2023-05-22",
        "--balance",
        "10000",
        "--stock",
        "AAPL=60",
        "--stock",
        "MSFT=40",
        "--payload",
        &payload,
        "--end",
        "2023-05-26",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Portfolio Results"))
        .stdout(predicate::str::contains("$10,178.90"))
        .stdout(predicate::str::contains("2023-05-22"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn value_json_reports_chronological_series() {
    let home = setup_temp_home();
    let payload = fixture("multi_symbol.json");

    let json = run_cmd_json(
        &home,
        &[
            "value",
            "--start",
            "2023-05-22",
            "--balance",
            "10000",
            "--stock",
            "AAPL=60",
            "--stock",
            "MSFT=40",
            "--payload",
            &payload,
            "--end",
            "2023-05-26",
        ],
    )
    .expect("value --json should succeed");

    assert_eq!(json["result"]["current_value"], "10178.90");
    assert_eq!(json["gain"], "178.90");
    assert_eq!(json["gain_percent"], "1.79");
    assert_eq!(json["end_date"], "2023-05-26");

    let series = json["result"]["series"].as_array().unwrap();
    assert_eq!(series.len(), 5);
    assert_eq!(series[0]["date"], "2023-05-22");
    assert_eq!(series[0]["value"], "10000.00");
    assert_eq!(series[2]["value"], "9827.43");
    assert_eq!(series[4]["date"], "2023-05-26");

    assert_eq!(json["price_series"]["AAPL"]["closes"][4], "174.20000");
    assert!(json["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn value_single_symbol_payload() {
    let home = setup_temp_home();
    let payload = fixture("single_symbol.json");

    let json = run_cmd_json(
        &home,
        &[
            "value",
            "-s",
            "2023-05-22",
            "-b",
            "1000",
            "--stock",
            "MSFT=100",
            "--payload",
            &payload,
        ],
    )
    .expect("single-symbol payload should value");

    assert_eq!(json["result"]["current_value"], "800.00");
    assert_eq!(json["gain_percent"], "-20.00");
    let values: Vec<&str> = json["result"]["series"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, vec!["1000.00", "900.00", "800.00"]);
}

#[test]
fn value_reports_overflow_instead_of_crashing() {
    let home = setup_temp_home();
    let payload = fixture("single_symbol.json");

    let stderr = run_cmd_failing(
        &home,
        &[
            "value",
            "-s",
            "2023-05-22",
            "-b",
            "10000000000000000000000000000",
            "--stock",
            "MSFT=100",
            "--payload",
            &payload,
        ],
    )
    .unwrap();
    assert!(stderr.contains("value of 'MSFT' is too large"), "{}", stderr);
    assert!(!stderr.contains("panicked"), "{}", stderr);
}

#[test]
fn value_reports_invalid_symbol() {
    let home = setup_temp_home();
    let payload = fixture("symbol_not_found.json");

    let stderr = run_cmd_failing(
        &home,
        &[
            "value",
            "--start",
            "2023-05-22",
            "--balance",
            "1000",
            "--stock",
            "AAAAA=100",
            "--payload",
            &payload,
        ],
    )
    .unwrap();
    assert!(stderr.contains("'AAAAA' is not a valid stock symbol"), "{}", stderr);
}

#[test]
fn value_reports_first_invalid_symbol_of_many() {
    let home = setup_temp_home();
    let payload = fixture("multi_symbol_not_found.json");

    let stderr = run_cmd_failing(
        &home,
        &[
            "value",
            "--start",
            "2023-05-22",
            "--balance",
            "1000",
            "--stock",
            "AAPL=50",
            "--stock",
            "QQQQQ=50",
            "--payload",
            &payload,
        ],
    )
    .unwrap();
    assert!(stderr.contains("'QQQQQ' is not a valid stock symbol"), "{}", stderr);
}

#[test]
fn value_reports_rate_limit() {
    let home = setup_temp_home();
    let payload = fixture("rate_limited.json");

    let stderr = run_cmd_failing(
        &home,
        &[
            "value",
            "--start",
            "2023-05-22",
            "--balance",
            "1000",
            "--stock",
            "AAPL=100",
            "--payload",
            &payload,
        ],
    )
    .unwrap();
    assert!(stderr.contains("API limit reached"), "{}", stderr);
}

#[test]
fn value_without_api_key_fails_before_network() {
    let home = setup_temp_home();

    let stderr = run_cmd_failing(
        &home,
        &[
            "value",
            "--start",
            "2023-05-22",
            "--balance",
            "1000",
            "--stock",
            "AAPL=100",
        ],
    )
    .unwrap();
    assert!(stderr.contains("no Twelve Data API key configured"), "{}", stderr);
}

#[test]
fn value_rejects_bad_allocation_before_reading_payload() {
    let home = setup_temp_home();

    let stderr = run_cmd_failing(
        &home,
        &[
            "value",
            "--start",
            "2023-05-22",
            "--balance",
            "1000",
            "--stock",
            "AAPL=60",
            "--stock",
            "MSFT=41",
            "--payload",
            "does/not/exist.json",
        ],
    )
    .unwrap();
    assert!(stderr.contains("should be 100% (got 101%)"), "{}", stderr);
}

#[test]
fn validate_accepts_good_portfolio() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args([
        "validate",
        "--start",
        "2023-05-22",
        "--balance",
        "2500",
        "--stock",
        "AAPL=33.3",
        "--stock",
        "MSFT=33.3",
        "--stock",
        "GME=33.4",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Portfolio is valid"))
        .stdout(predicate::str::contains("$2,500.00"));
}

#[test]
fn validate_reports_one_problem_at_a_time() {
    let home = setup_temp_home();

    let stderr = run_cmd_failing(
        &home,
        &["validate", "--balance", "0", "--stock", "GOOGLE=100"],
    )
    .unwrap();
    assert!(stderr.contains("valid start date"), "{}", stderr);
    assert!(!stderr.contains("initial balance"), "{}", stderr);

    let stderr = run_cmd_failing(
        &home,
        &[
            "validate",
            "--start",
            "2023-05-22",
            "--balance",
            "100",
            "--stock",
            "GOOGLE=100",
        ],
    )
    .unwrap();
    assert!(stderr.contains("'GOOGLE' exceeds the maximum character limit of 5"), "{}", stderr);
}

#[test]
fn validate_rejects_negative_balance() {
    let home = setup_temp_home();

    let stderr = run_cmd_failing(
        &home,
        &[
            "validate",
            "--start",
            "2023-05-22",
            "--balance",
            "-10",
            "--stock",
            "AAPL=100",
        ],
    )
    .unwrap();
    assert!(stderr.contains("initial balance greater than 0"), "{}", stderr);
}

#[test]
fn validate_reports_overflowing_allocations_as_mismatch() {
    let home = setup_temp_home();

    let stderr = run_cmd_failing(
        &home,
        &[
            "validate",
            "--start",
            "2023-05-22",
            "--balance",
            "1000",
            "--stock",
            "A=79228162514264337593543950335",
            "--stock",
            "B=79228162514264337593543950335",
        ],
    )
    .unwrap();
    assert!(stderr.contains("total allocation percentage should be 100%"), "{}", stderr);
    assert!(!stderr.contains("panicked"), "{}", stderr);
}

#[test]
fn config_show_masks_env_key() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.env("TWELVEDATA_API_KEY", "819d185bea314c1d");
    cmd.args(["--json", "config", "show"]);
    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["api_key"], "************4c1d");
    assert_eq!(json["base_url"], "https://api.twelvedata.com");
}

#[test]
fn config_show_reads_file_named_by_env() {
    let home = setup_temp_home();
    let path = home.path().join("custom.toml");
    std::fs::write(&path, "api_key = \"abcdefgh\"\noutput_size = 250\n").unwrap();

    let mut cmd = base_cmd(&home);
    cmd.env("HINDSIGHT_CONFIG", &path);
    cmd.args(["--json", "config", "show"]);
    let output = cmd.output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["api_key"], "****efgh");
    assert_eq!(json["output_size"], 250);
    assert_eq!(json["path"], path.display().to_string());
}
