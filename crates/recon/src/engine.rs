//! The tiered matching engine.
//!
//! Three passes over the two record sets, strictest first: exact matches
//! (direction, amount and date window all agree), fuzzy matches (a scored
//! composite of direction, voucher text and category), then split matches
//! (several SMS records summing to one ledger entry). A record consumed by
//! any tier is unavailable to every later comparison; nothing backtracks.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use milap_core::{DateRange, Direction, MatchStatus, Money, Record};

use crate::config::{ReconConfig, ScoreWeights};
use crate::util::partial_similarity;

/// Per-tier match counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub exact: usize,
    pub fuzzy: usize,
    pub splits: usize,
    pub split_legs: usize,
}

/// Holds the tolerances and weights for a run. All record state lives in
/// the slices handed to [`MatchEngine::reconcile`].
pub struct MatchEngine {
    tolerance_days: u32,
    tolerance_amount: Money,
    weights: ScoreWeights,
}

impl MatchEngine {
    pub fn new(config: &ReconConfig) -> MatchEngine {
        MatchEngine {
            tolerance_days: config.tolerance_days,
            tolerance_amount: config.tolerance_amount,
            weights: config.weights.clone(),
        }
    }

    /// Runs the three tiers, mutating statuses and match notes in place.
    ///
    /// Ledger records are visited in table order. Each looks for an exact
    /// candidate first and a fuzzy candidate second (fuzzy only when the
    /// amount tolerance is nonzero); the split pass then sweeps whole
    /// same-day groups into the remaining ledger entries. Already tallied
    /// records are left alone, so a second run over the same slices
    /// changes nothing.
    pub fn reconcile(&self, sms: &mut [Record], tally: &mut [Record]) -> MatchStats {
        let mut stats = MatchStats::default();
        let mut sms_free: Vec<bool> = sms.iter().map(|r| !r.is_tallied()).collect();

        for ti in 0..tally.len() {
            if tally[ti].is_tallied() {
                continue;
            }
            let (Some(t_date), Some(t_amount)) = (tally[ti].date, tally[ti].amount) else {
                continue;
            };
            let window = DateRange::window(t_date, self.tolerance_days);

            if let Some((si, s_date, s_amount)) =
                self.exact_candidate(sms, &sms_free, &tally[ti], window)
            {
                sms_free[si] = false;
                sms[si].mark_tallied(format!(
                    "Matched with Tally: Amount {}, Date {}",
                    t_amount,
                    t_date.format("%d-%b-%Y")
                ));
                tally[ti].mark_tallied(format!(
                    "Matched with SMS: Amount {}, Date {}",
                    s_amount,
                    s_date.format("%d-%b-%Y")
                ));
                stats.exact += 1;
                continue;
            }

            if self.tolerance_amount > Money::zero() {
                if let Some((si, s_date, s_amount)) =
                    self.fuzzy_candidate(sms, &sms_free, &tally[ti], window)
                {
                    let day_diff = (s_date - t_date).num_days().abs();
                    let direction = if sms[si].direction == tally[ti].direction {
                        "same"
                    } else {
                        "different"
                    };
                    sms_free[si] = false;
                    sms[si].mark_tallied(format!(
                        "Amount: {t_amount}, Date diff: {day_diff} days, Direction: {direction}"
                    ));
                    tally[ti].mark_tallied(format!(
                        "Amount: {s_amount}, Date diff: {day_diff} days, Direction: {direction}"
                    ));
                    stats.fuzzy += 1;
                }
            }
        }

        self.split_pass(sms, &mut sms_free, tally, &mut stats);

        // Everything unconsumed stays unmatched. Statuses start there, so
        // the sweep is idempotent.
        for (si, free) in sms_free.iter().enumerate() {
            if *free {
                sms[si].status = MatchStatus::Unmatched;
            }
        }
        for record in tally.iter_mut() {
            if !record.is_tallied() {
                record.status = MatchStatus::Unmatched;
            }
        }

        debug!(
            exact = stats.exact,
            fuzzy = stats.fuzzy,
            splits = stats.splits,
            "matching complete"
        );
        stats
    }

    /// Tier 1: same direction (and not Unknown), amount within tolerance,
    /// date within the window. Among candidates the smallest day distance
    /// wins; ties go to the earlier record.
    fn exact_candidate(
        &self,
        sms: &[Record],
        sms_free: &[bool],
        tally: &Record,
        window: DateRange,
    ) -> Option<(usize, NaiveDate, Money)> {
        let t_date = tally.date?;
        let t_amount = tally.amount?;

        let mut best: Option<(usize, NaiveDate, Money)> = None;
        let mut best_diff = i64::MAX;
        for (si, record) in sms.iter().enumerate() {
            if !sms_free[si] {
                continue;
            }
            let (Some(date), Some(amount)) = (record.date, record.amount) else {
                continue;
            };
            if !window.contains(date) || amount.abs_diff(t_amount) > self.tolerance_amount {
                continue;
            }
            if record.direction == Direction::Unknown || record.direction != tally.direction {
                continue;
            }
            let day_diff = (date - t_date).num_days().abs();
            // Strict less-than, so the first record at the minimal
            // distance keeps the slot.
            if day_diff < best_diff {
                best_diff = day_diff;
                best = Some((si, date, amount));
            }
        }
        best
    }

    /// Tier 2: any candidate in the date and amount window, regardless of
    /// direction, scored by [`MatchEngine::score_pair`]. The top score
    /// wins if it clears the acceptance threshold; ties go to the earlier
    /// record.
    fn fuzzy_candidate(
        &self,
        sms: &[Record],
        sms_free: &[bool],
        tally: &Record,
        window: DateRange,
    ) -> Option<(usize, NaiveDate, Money)> {
        let t_amount = tally.amount?;

        let mut best: Option<(usize, NaiveDate, Money)> = None;
        let mut best_score = 0.0_f64;
        for (si, record) in sms.iter().enumerate() {
            if !sms_free[si] {
                continue;
            }
            let (Some(date), Some(amount)) = (record.date, record.amount) else {
                continue;
            };
            if !window.contains(date) || amount.abs_diff(t_amount) > self.tolerance_amount {
                continue;
            }
            let score = self.score_pair(tally, record);
            // Strict greater-than, so the first record at the top score
            // keeps the slot.
            if score > best_score {
                best_score = score;
                best = Some((si, date, amount));
            }
        }

        if best_score > self.weights.accept_threshold {
            best
        } else {
            None
        }
    }

    /// Composite fuzzy score for one ledger/SMS pair.
    ///
    /// Direction agreement and category identity add flat bonuses. The
    /// voucher number adds a flat bonus when it appears verbatim in the
    /// SMS text, or a weighted partial-similarity contribution otherwise;
    /// the two are mutually exclusive.
    fn score_pair(&self, tally: &Record, sms: &Record) -> f64 {
        let w = &self.weights;
        let mut score = 0.0;

        if sms.direction == tally.direction {
            score += w.direction_bonus;
        }
        if !tally.voucher_no.is_empty() {
            if sms.description.contains(&tally.voucher_no)
                || sms.remarks.contains(&tally.voucher_no)
            {
                score += w.voucher_bonus;
            } else {
                score += partial_similarity(&tally.voucher_no, &sms.description)
                    * w.description_weight;
                score += partial_similarity(&tally.voucher_no, &sms.remarks) * w.remarks_weight;
            }
        }
        if tally.category == sms.category {
            score += w.category_bonus;
        }
        score
    }

    /// Tier 3: unmatched SMS records sharing the ledger entry's exact date
    /// and category, whose amounts sum to it within tolerance. The whole
    /// group is consumed as one many-to-one match.
    fn split_pass(
        &self,
        sms: &mut [Record],
        sms_free: &mut [bool],
        tally: &mut [Record],
        stats: &mut MatchStats,
    ) {
        for ti in 0..tally.len() {
            if tally[ti].is_tallied() {
                continue;
            }
            let (Some(t_date), Some(t_amount)) = (tally[ti].date, tally[ti].amount) else {
                continue;
            };

            let group: Vec<usize> = sms
                .iter()
                .enumerate()
                .filter(|(si, record)| {
                    sms_free[*si]
                        && record.date == Some(t_date)
                        && record.category == tally[ti].category
                })
                .map(|(si, _)| si)
                .collect();
            if group.is_empty() {
                continue;
            }

            // Unparseable leg amounts contribute nothing to the sum but
            // the leg still belongs to the group.
            let total = group
                .iter()
                .filter_map(|&si| sms[si].amount)
                .fold(Money::zero(), |sum, amount| sum + amount);
            if total.abs_diff(t_amount) > self.tolerance_amount {
                continue;
            }

            for &si in &group {
                sms_free[si] = false;
                sms[si].mark_tallied(format!(
                    "Part of split: Amount {}, Date {}",
                    t_amount,
                    t_date.format("%d-%b-%Y")
                ));
            }
            tally[ti].mark_tallied(format!("Split across {} SMS entries", group.len()));
            stats.splits += 1;
            stats.split_legs += group.len();
        }
    }
}
