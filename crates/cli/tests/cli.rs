use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const SMS_CSV: &str = "\
TransactionDate,Description,Debit,Credit,PaymentMode
2024-01-05,RENT JANUARY,100.00,,Rent
";

const TALLY_CSV: &str = "\
Date,Particulars,Vch Type,Vch No.,Debit,Credit
2024-01-05,Rent,Payment,RV1,100.00,
";

fn write_inputs(dir: &std::path::Path) -> (String, String) {
    let sms = dir.join("sms.csv");
    let tally = dir.join("tally.csv");
    fs::write(&sms, SMS_CSV).expect("write sms");
    fs::write(&tally, TALLY_CSV).expect("write tally");
    (
        sms.to_string_lossy().into_owned(),
        tally.to_string_lossy().into_owned(),
    )
}

fn milap() -> Command {
    Command::cargo_bin("milap").expect("binary should build")
}

#[test]
fn reconciles_and_writes_both_reports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (sms, tally) = write_inputs(dir.path());
    let out = dir.path().to_string_lossy().into_owned();

    milap()
        .args(["--sms", &sms, "--tally", &tally, "--out-dir", &out])
        .assert()
        .success()
        .stdout(predicate::str::contains("Matched: 1 SMS / 1 Tally"));

    let sms_report = fs::read_to_string(dir.path().join("sms_reco.csv")).expect("sms report");
    assert!(sms_report.contains("Tallied"));
    assert!(sms_report.contains("Matched with Tally"));

    let tally_report =
        fs::read_to_string(dir.path().join("tally_reco.csv")).expect("tally report");
    assert!(tally_report.contains("RV1"));
}

#[test]
fn json_flag_prints_machine_readable_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (sms, tally) = write_inputs(dir.path());
    let out = dir.path().to_string_lossy().into_owned();

    milap()
        .args(["--sms", &sms, "--tally", &tally, "--out-dir", &out, "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched_sms_count\": 1"))
        .stdout(predicate::str::contains("\"discrepancy\": false"));
}

#[test]
fn tolerance_days_flag_narrows_the_window() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sms = dir.path().join("sms.csv");
    let tally = dir.path().join("tally.csv");
    fs::write(&sms, SMS_CSV).expect("write sms");
    fs::write(
        &tally,
        "Date,Particulars,Vch Type,Vch No.,Debit,Credit\n\
         2024-01-06,Rent,Payment,RV1,100.00,\n",
    )
    .expect("write tally");
    let out = dir.path().to_string_lossy().into_owned();

    milap()
        .args([
            "--sms",
            sms.to_str().expect("utf8 path"),
            "--tally",
            tally.to_str().expect("utf8 path"),
            "--out-dir",
            &out,
            "--tolerance-days",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Matched: 0 SMS / 0 Tally"));
}

#[test]
fn missing_input_file_fails_with_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (_, tally) = write_inputs(dir.path());

    milap()
        .args(["--sms", "/nonexistent/sms.csv", "--tally", &tally])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn invalid_config_file_fails_before_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (sms, tally) = write_inputs(dir.path());
    let config = dir.path().join("milap.toml");
    fs::write(&config, "tolerance-dayz = 1\n").expect("write config");

    milap()
        .args([
            "--sms",
            &sms,
            "--tally",
            &tally,
            "--config",
            config.to_str().expect("utf8 path"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn unreadable_gst_register_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (sms, tally) = write_inputs(dir.path());
    let out = dir.path().to_string_lossy().into_owned();

    milap()
        .args([
            "--sms",
            &sms,
            "--tally",
            &tally,
            "--out-dir",
            &out,
            "--gst",
            "/nonexistent/gstr1.csv",
        ])
        .assert()
        .success();
}
