//! Post-run summary statistics.

use serde::Serialize;

use milap_core::{Money, Record};

/// Counts and sums over both record sets after matching. Records with no
/// parseable amount count toward the totals as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub matched_sms_count: usize,
    pub matched_tally_count: usize,
    pub unmatched_sms_count: usize,
    pub unmatched_tally_count: usize,
    pub matched_sms_sum: Money,
    pub matched_tally_sum: Money,
    pub total_sms_sum: Money,
    pub total_tally_sum: Money,
}

impl ReconSummary {
    /// True when the two matched sums disagree by more than a paisa. On a
    /// clean exact-only run they are equal; fuzzy and split tolerances can
    /// pull them apart.
    pub fn has_discrepancy(&self) -> bool {
        self.matched_sms_sum.abs_diff(self.matched_tally_sum) > Money::from_cents(1)
    }
}

pub fn summarize(sms: &[Record], tally: &[Record]) -> ReconSummary {
    let (matched_sms_count, matched_sms_sum, total_sms_sum) = tally_side(sms);
    let (matched_tally_count, matched_tally_sum, total_tally_sum) = tally_side(tally);

    ReconSummary {
        matched_sms_count,
        matched_tally_count,
        unmatched_sms_count: sms.len() - matched_sms_count,
        unmatched_tally_count: tally.len() - matched_tally_count,
        matched_sms_sum,
        matched_tally_sum,
        total_sms_sum,
        total_tally_sum,
    }
}

fn tally_side(records: &[Record]) -> (usize, Money, Money) {
    let mut matched = 0;
    let mut matched_sum = Money::zero();
    let mut total_sum = Money::zero();
    for record in records {
        let amount = record.amount.unwrap_or_else(Money::zero);
        total_sum = total_sum + amount;
        if record.is_tallied() {
            matched += 1;
            matched_sum = matched_sum + amount;
        }
    }
    (matched, matched_sum, total_sum)
}
