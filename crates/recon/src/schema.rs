//! Column discovery for the messy inputs.
//!
//! Tally exports bury the real header under report-title rows and have
//! renamed their voucher columns more than once over the years. GST
//! registers label the invoice value in several spellings. Everything here
//! works on header text alone so each source's quirks stay in one place.

use std::sync::OnceLock;

use milap_core::FiscalYear;
use regex::Regex;

/// Header spellings that mark a GST register's invoice-value column.
const INVOICE_VALUE_HEADERS: &[&str] = &[
    "INVOICE VALUE",
    "INVOICE VALUE(₹)",
    "INVOICE VALUE (₹)",
    "INVOICEVALUE",
];

/// Alias → canonical column renames seen in Tally exports. Applied in
/// order, and only while the canonical name is absent.
const LEDGER_COLUMN_ALIASES: &[(&str, &str)] = &[
    ("TallyNote", "Notes"),
    ("Voucher Type", "Vch Type"),
    ("Voucher No", "Vch No."),
    ("Voucher No.", "Vch No."),
    ("Vch No", "Vch No."),
];

/// Finds the first row whose first cell mentions "Date", any case. Tally
/// puts the real header there, below the report title rows.
pub fn find_header_row(rows: &[Vec<String>]) -> Option<usize> {
    rows.iter().position(|row| {
        row.first()
            .map(|cell| cell.to_uppercase().contains("DATE"))
            .unwrap_or(false)
    })
}

/// Rewrites historical column names to their canonical spelling. A rename
/// is skipped when the canonical column already exists, including when an
/// earlier alias in the list just created it.
pub fn resolve_ledger_aliases(columns: &mut [String]) {
    for (alias, canonical) in LEDGER_COLUMN_ALIASES {
        if columns.iter().any(|col| col == canonical) {
            continue;
        }
        if let Some(col) = columns.iter_mut().find(|col| col.as_str() == *alias) {
            *col = (*canonical).to_string();
        }
    }
}

/// First column whose header contains any invoice-value spelling,
/// case-insensitively.
pub fn find_invoice_amount_column(columns: &[String]) -> Option<usize> {
    columns.iter().position(|col| {
        let upper = col.to_uppercase();
        INVOICE_VALUE_HEADERS.iter().any(|header| upper.contains(header))
    })
}

/// First column whose header contains "date", case-insensitively.
pub fn find_date_column(columns: &[String]) -> Option<usize> {
    columns
        .iter()
        .position(|col| col.to_lowercase().contains("date"))
}

/// Recovers a fiscal year from an "NN-NN" fragment in a register filename,
/// assuming the 2000s: `gstr1-23-24.csv` → FY2023.
pub fn year_from_filename(name: &str) -> Option<FiscalYear> {
    static YEAR_SPAN: OnceLock<Regex> = OnceLock::new();
    let pattern =
        YEAR_SPAN.get_or_init(|| Regex::new(r"(\d{2})-(\d{2})").expect("invalid regex"));
    let captures = pattern.captures(name)?;
    let start: i32 = captures.get(1)?.as_str().parse().ok()?;
    Some(FiscalYear::new(2000 + start))
}
