use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;
use super::period::FiscalYear;

/// Which ledger a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Sms,
    Tally,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Sms => write!(f, "SMS"),
            Side::Tally => write!(f, "Tally"),
        }
    }
}

/// Cash direction derived from the debit/credit cells. Credit takes
/// precedence when both cells hold nonzero numbers; Unknown when neither
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Debit,
    Credit,
    Unknown,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Debit => write!(f, "Debit"),
            Direction::Credit => write!(f, "Credit"),
            Direction::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Match outcome. Tallied is terminal within a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Unmatched,
    Tallied,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Unmatched => write!(f, "Not Tallied"),
            MatchStatus::Tallied => write!(f, "Tallied"),
        }
    }
}

/// GST cross-reference outcome for service/claim records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GstStatus {
    NotChecked,
    Found(FiscalYear),
    NotFound,
    Invalid,
}

impl fmt::Display for GstStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GstStatus::NotChecked => write!(f, "Not Checked"),
            GstStatus::Found(year) => write!(f, "Found in GST {}", year.year()),
            GstStatus::NotFound => write!(f, "Not Found in GST"),
            GstStatus::Invalid => write!(f, "Invalid Date/Amount"),
        }
    }
}

/// One normalized row from either ledger.
///
/// `date` is null when the source cell failed every known format; `amount`
/// is null only when neither the debit nor the credit cell parsed as a
/// number. Null-dated or null-amount records sit out the matching tiers
/// that need those fields, but they are never dropped from the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub side: Side,
    pub date: Option<NaiveDate>,
    /// Signed amount: debit − credit, rounded to two places.
    pub amount: Option<Money>,
    pub direction: Direction,
    /// Uppercased, alphanumeric-only join key (from the description on the
    /// SMS side, the voucher number on the Tally side).
    pub identifier: String,
    /// Uppercased transaction-type tag.
    pub category: String,
    pub description: String,
    pub remarks: String,
    pub mode: String,
    pub voucher_no: String,
    pub status: MatchStatus,
    pub gst_status: GstStatus,
    pub match_note: Option<String>,
}

impl Record {
    pub fn new(side: Side) -> Self {
        Record {
            side,
            date: None,
            amount: None,
            direction: Direction::Unknown,
            identifier: String::new(),
            category: String::new(),
            description: String::new(),
            remarks: String::new(),
            mode: String::new(),
            voucher_no: String::new(),
            status: MatchStatus::Unmatched,
            gst_status: GstStatus::NotChecked,
            match_note: None,
        }
    }

    pub fn is_tallied(&self) -> bool {
        self.status == MatchStatus::Tallied
    }

    /// Marks the record matched and attaches the explanation. A Tallied
    /// record is never reverted.
    pub fn mark_tallied(&mut self, note: String) {
        self.status = MatchStatus::Tallied;
        self.match_note = Some(note);
    }

    /// Calendar year of the record, for GST lookups.
    pub fn fiscal_year(&self) -> Option<FiscalYear> {
        self.date.map(FiscalYear::from_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_record_starts_unmatched_and_unchecked() {
        let r = Record::new(Side::Sms);
        assert_eq!(r.status, MatchStatus::Unmatched);
        assert_eq!(r.gst_status, GstStatus::NotChecked);
        assert!(r.match_note.is_none());
        assert!(!r.is_tallied());
    }

    #[test]
    fn mark_tallied_sets_status_and_note() {
        let mut r = Record::new(Side::Tally);
        r.mark_tallied("Matched with SMS: Amount 100.00, Date 10-Jan-2024".to_string());
        assert!(r.is_tallied());
        assert_eq!(
            r.match_note.as_deref(),
            Some("Matched with SMS: Amount 100.00, Date 10-Jan-2024")
        );
    }

    #[test]
    fn status_report_strings() {
        assert_eq!(MatchStatus::Unmatched.to_string(), "Not Tallied");
        assert_eq!(MatchStatus::Tallied.to_string(), "Tallied");
    }

    #[test]
    fn gst_status_report_strings() {
        assert_eq!(GstStatus::NotChecked.to_string(), "Not Checked");
        assert_eq!(GstStatus::Found(FiscalYear::new(2023)).to_string(), "Found in GST 2023");
        assert_eq!(GstStatus::NotFound.to_string(), "Not Found in GST");
        assert_eq!(GstStatus::Invalid.to_string(), "Invalid Date/Amount");
    }

    #[test]
    fn fiscal_year_comes_from_the_date() {
        let mut r = Record::new(Side::Sms);
        assert_eq!(r.fiscal_year(), None);
        r.date = Some(date(2023, 7, 14));
        assert_eq!(r.fiscal_year(), Some(FiscalYear::new(2023)));
    }
}
