//! Reconciliation engine for bank SMS feeds against Tally ledger exports.
//!
//! Pure transformation, no I/O: callers hand in [`RawTable`]s (parsed from
//! CSV text or assembled by hand), the pipeline normalizes them into
//! [`milap_core::Record`]s, runs the tiered matcher, cross-checks service
//! and claim entries against GST registers, and reduces everything to a
//! summary.

pub mod config;
pub mod engine;
pub mod error;
pub mod gst;
pub mod normalize;
pub mod schema;
pub mod summary;
pub mod table;
pub(crate) mod util;

pub use config::{ReconConfig, ScoreWeights};
pub use engine::{MatchEngine, MatchStats};
pub use error::ReconError;
pub use gst::GstRegister;
pub use summary::{summarize, ReconSummary};
pub use table::RawTable;

use milap_core::Record;
use tracing::{info, warn};

/// Everything one reconciliation run produces.
#[derive(Debug, Clone)]
pub struct ReconOutcome {
    pub sms: Vec<Record>,
    pub tally: Vec<Record>,
    pub stats: MatchStats,
    pub summary: ReconSummary,
}

/// Runs the full pipeline: normalize both tables, match, verify GST
/// categories when enabled, summarize.
///
/// `gst_tables` pairs each register table with its source filename; the
/// filename can carry the fiscal year when the table has no date column.
/// Registers without a recognizable invoice-value column are skipped with
/// a warning.
pub fn reconcile(
    sms_table: &RawTable,
    tally_table: &RawTable,
    gst_tables: &[(RawTable, String)],
    config: &ReconConfig,
) -> Result<ReconOutcome, ReconError> {
    config.validate()?;

    let mut sms = normalize::normalize_sms(sms_table);
    let mut tally = normalize::normalize_ledger(tally_table);
    info!(sms = sms.len(), tally = tally.len(), "normalized input tables");

    let stats = MatchEngine::new(config).reconcile(&mut sms, &mut tally);

    if config.check_gst && !gst_tables.is_empty() {
        let registers: Vec<GstRegister> = gst_tables
            .iter()
            .filter_map(|(table, source)| {
                let register = GstRegister::preprocess(table, source);
                if register.is_none() {
                    warn!(source = %source, "gst table has no invoice-value column, skipping");
                }
                register
            })
            .collect();
        gst::verify_service_claims(&mut sms, &registers, config.tolerance_amount);
        gst::verify_service_claims(&mut tally, &registers, config.tolerance_amount);
    }

    let summary = summarize(&sms, &tally);
    info!(
        matched_sms = summary.matched_sms_count,
        matched_tally = summary.matched_tally_count,
        discrepancy = summary.has_discrepancy(),
        "reconciliation finished"
    );

    Ok(ReconOutcome {
        sms,
        tally,
        stats,
        summary,
    })
}
