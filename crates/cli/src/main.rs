use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use milap_core::{Money, Record};
use milap_recon::{reconcile, RawTable, ReconConfig, ReconOutcome};

#[derive(Parser)]
#[command(
    name = "milap",
    version,
    about = "Reconcile bank SMS exports against Tally ledger exports"
)]
struct Cli {
    /// Bank SMS export (CSV).
    #[arg(long, value_name = "FILE")]
    sms: PathBuf,

    /// Tally ledger export (CSV).
    #[arg(long, value_name = "FILE")]
    tally: PathBuf,

    /// GST register (CSV); repeat for several years.
    #[arg(long = "gst", value_name = "FILE")]
    gst: Vec<PathBuf>,

    /// Date window in days for the matching tiers.
    #[arg(long, value_name = "DAYS")]
    tolerance_days: Option<u32>,

    /// Absolute amount tolerance; nonzero enables fuzzy matching.
    #[arg(long, value_name = "AMOUNT")]
    tolerance_amount: Option<Decimal>,

    /// Skip GST verification even when registers are given.
    #[arg(long)]
    skip_gst: bool,

    /// TOML configuration file; flags override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the two reconciled CSV reports.
    #[arg(long, value_name = "DIR", default_value = ".")]
    out_dir: PathBuf,

    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let sms_table = read_table(&cli.sms)?;
    let tally_table = read_table(&cli.tally)?;
    let gst_tables = read_gst_tables(&cli.gst);

    let outcome = reconcile(&sms_table, &tally_table, &gst_tables, &config)?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create {}", cli.out_dir.display()))?;
    let sms_path = cli.out_dir.join("sms_reco.csv");
    let tally_path = cli.out_dir.join("tally_reco.csv");
    write_sms_report(&sms_path, &outcome.sms)?;
    write_tally_report(&tally_path, &outcome.tally)?;

    if cli.json {
        print_json(&outcome)?;
    } else {
        print_summary(&outcome, &sms_path, &tally_path);
    }
    Ok(())
}

/// Config file first, then flag overrides, then a final validation so a
/// nonsense combination fails before any file is touched.
fn build_config(cli: &Cli) -> Result<ReconConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ReconConfig::from_toml(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ReconConfig::default(),
    };

    if let Some(days) = cli.tolerance_days {
        config.tolerance_days = days;
    }
    if let Some(amount) = cli.tolerance_amount {
        config.tolerance_amount = Money::from_decimal(amount);
    }
    if cli.skip_gst {
        config.check_gst = false;
    }
    config.validate()?;
    Ok(config)
}

fn read_table(path: &Path) -> Result<RawTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let table = RawTable::from_csv_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(table)
}

/// A register that fails to load is skipped with a warning; one bad yearly
/// file should not abort the whole reconciliation.
fn read_gst_tables(paths: &[PathBuf]) -> Vec<(RawTable, String)> {
    let mut tables = Vec::new();
    for path in paths {
        match read_table(path) {
            Ok(table) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tables.push((table, name));
            }
            Err(err) => warn!("skipping gst register {}: {err:#}", path.display()),
        }
    }
    tables
}

fn format_date(record: &Record) -> String {
    record
        .date
        .map(|d| d.format("%d-%b-%Y").to_string())
        .unwrap_or_default()
}

fn format_amount(record: &Record) -> String {
    record.amount.map(|a| a.to_string()).unwrap_or_default()
}

fn write_sms_report(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([
        "Date",
        "Description",
        "Remarks",
        "Mode",
        "Category",
        "Amount",
        "Direction",
        "Status",
        "GST Status",
        "Match Note",
    ])?;
    for record in records {
        writer.write_record([
            format_date(record),
            record.description.clone(),
            record.remarks.clone(),
            record.mode.clone(),
            record.category.clone(),
            format_amount(record),
            record.direction.to_string(),
            record.status.to_string(),
            record.gst_status.to_string(),
            record.match_note.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_tally_report(path: &Path, records: &[Record]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record([
        "Date",
        "Particulars",
        "Vch Type",
        "Vch No.",
        "Notes",
        "Amount",
        "Direction",
        "Status",
        "GST Status",
        "Match Note",
    ])?;
    for record in records {
        writer.write_record([
            format_date(record),
            record.description.clone(),
            record.category.clone(),
            record.voucher_no.clone(),
            record.remarks.clone(),
            format_amount(record),
            record.direction.to_string(),
            record.status.to_string(),
            record.gst_status.to_string(),
            record.match_note.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(outcome: &ReconOutcome, sms_path: &Path, tally_path: &Path) {
    let summary = &outcome.summary;
    println!(
        "Matched: {} SMS / {} Tally",
        summary.matched_sms_count, summary.matched_tally_count
    );
    println!(
        "Unmatched: {} SMS / {} Tally",
        summary.unmatched_sms_count, summary.unmatched_tally_count
    );
    println!(
        "Matched sums: SMS {} vs Tally {}",
        summary.matched_sms_sum, summary.matched_tally_sum
    );
    println!(
        "Totals: SMS {} / Tally {}",
        summary.total_sms_sum, summary.total_tally_sum
    );
    println!(
        "Tiers: {} exact, {} fuzzy, {} splits ({} legs)",
        outcome.stats.exact, outcome.stats.fuzzy, outcome.stats.splits, outcome.stats.split_legs
    );
    if summary.has_discrepancy() {
        println!("WARNING: matched sums differ by more than 0.01");
    }
    println!("Reports: {} and {}", sms_path.display(), tally_path.display());
}

fn print_json(outcome: &ReconOutcome) -> Result<()> {
    let value = serde_json::json!({
        "summary": outcome.summary,
        "stats": outcome.stats,
        "discrepancy": outcome.summary.has_discrepancy(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
