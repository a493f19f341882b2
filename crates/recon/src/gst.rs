//! GST cross-reference verification.
//!
//! Service and claim entries should each have a GST invoice behind them.
//! Registers arrive as yearly spreadsheets with drifting column names, so
//! each table is preprocessed once into amounts plus per-row fiscal years
//! and then probed per record. Matching is deliberately loose: an amount
//! within tolerance, preferably in the record's own year.

use tracing::debug;

use milap_core::{FiscalYear, GstStatus, Money, Record};

use crate::normalize::{parse_date_lenient, parse_number};
use crate::schema;
use crate::table::{cell, RawTable};

/// Category fragments that mark a record for verification.
const FLAGGED_TAGS: &[&str] = &["SERVICE", "CLAIM"];

/// One preprocessed register: invoice amounts with per-row years.
#[derive(Debug, Clone)]
pub struct GstRegister {
    source: String,
    rows: Vec<GstRow>,
    has_years: bool,
}

#[derive(Debug, Clone, Copy)]
struct GstRow {
    amount: Option<Money>,
    year: Option<FiscalYear>,
}

impl GstRegister {
    /// Builds a register from a raw table. None when the table has no
    /// recognizable invoice-value column; such tables are skipped, not
    /// errors. Without a date column every row inherits the year embedded
    /// in the filename, when there is one.
    pub fn preprocess(table: &RawTable, source: &str) -> Option<GstRegister> {
        let amount_col = schema::find_invoice_amount_column(&table.columns)?;
        let date_col = schema::find_date_column(&table.columns);
        let filename_year = match date_col {
            Some(_) => None,
            None => schema::year_from_filename(source),
        };

        let rows: Vec<GstRow> = table
            .rows
            .iter()
            .map(|row| {
                let amount = parse_number(cell(row, Some(amount_col))).map(Money::from_decimal);
                let year = match date_col {
                    // Registers write dates day-first.
                    Some(col) => {
                        parse_date_lenient(cell(row, Some(col)), true).map(FiscalYear::from_date)
                    }
                    None => filename_year,
                };
                GstRow { amount, year }
            })
            .collect();

        let has_years = rows.iter().any(|row| row.year.is_some());
        debug!(
            source = %source,
            rows = rows.len(),
            has_years,
            "gst register preprocessed"
        );
        Some(GstRegister {
            source: source.to_string(),
            rows,
            has_years,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether any row's amount lies within `tolerance` of `amount`. Rows
    /// from the queried year are searched first; when none exist for that
    /// year (or the register has no year data at all) every row counts.
    fn contains_amount(&self, amount: Money, year: FiscalYear, tolerance: Money) -> bool {
        let hit = |row: &GstRow| {
            row.amount
                .map(|candidate| candidate.abs_diff(amount) <= tolerance)
                .unwrap_or(false)
        };

        if self.has_years {
            let mut in_year = self
                .rows
                .iter()
                .filter(|row| row.year == Some(year))
                .peekable();
            if in_year.peek().is_some() {
                return in_year.any(|row| hit(row));
            }
        }
        self.rows.iter().any(|row| hit(row))
    }
}

/// Sets a verification status on every service/claim record. Registers
/// are probed in input order and the first hit wins. Records lacking a
/// date or amount cannot be verified and are marked invalid. With no
/// registers at all, nothing changes and every status stays NotChecked.
pub fn verify_service_claims(records: &mut [Record], registers: &[GstRegister], tolerance: Money) {
    if registers.is_empty() {
        return;
    }
    for record in records.iter_mut() {
        if !is_flagged(&record.category) {
            continue;
        }
        let (Some(amount), Some(year)) = (record.amount, record.fiscal_year()) else {
            record.gst_status = GstStatus::Invalid;
            continue;
        };
        let hit = registers
            .iter()
            .find(|register| register.contains_amount(amount, year, tolerance));
        record.gst_status = match hit {
            Some(register) => {
                debug!(source = %register.source(), %amount, %year, "gst invoice found");
                GstStatus::Found(year)
            }
            None => GstStatus::NotFound,
        };
    }
}

fn is_flagged(category: &str) -> bool {
    let upper = category.to_uppercase();
    FLAGGED_TAGS.iter().any(|tag| upper.contains(tag))
}
