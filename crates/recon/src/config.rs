//! Run configuration.
//!
//! Tolerances and fuzzy-score weights were tuned against years of manual
//! reconciliation spreadsheets rather than derived from anything, so they
//! are kept adjustable instead of baked in.

use milap_core::Money;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

/// Scoring constants for the fuzzy matching tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ScoreWeights {
    /// Added when both records move money the same way.
    pub direction_bonus: f64,
    /// Added when the voucher number appears verbatim in the SMS text.
    pub voucher_bonus: f64,
    /// Multiplier on voucher/description partial similarity (0–100).
    pub description_weight: f64,
    /// Multiplier on voucher/remarks partial similarity (0–100).
    pub remarks_weight: f64,
    /// Added when the category tags are identical.
    pub category_bonus: f64,
    /// A candidate must score strictly above this to be accepted.
    pub accept_threshold: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            direction_bonus: 20.0,
            voucher_bonus: 50.0,
            description_weight: 0.3,
            remarks_weight: 0.2,
            category_bonus: 30.0,
            accept_threshold: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ReconConfig {
    /// Half-width of the inclusive date window used by the first two tiers.
    pub tolerance_days: u32,
    /// Inclusive absolute amount tolerance. Zero disables the fuzzy tier.
    pub tolerance_amount: Money,
    /// Run GST cross-reference verification after matching.
    pub check_gst: bool,
    pub weights: ScoreWeights,
}

impl Default for ReconConfig {
    fn default() -> Self {
        ReconConfig {
            tolerance_days: 30,
            tolerance_amount: Money::zero(),
            check_gst: true,
            weights: ScoreWeights::default(),
        }
    }
}

impl ReconConfig {
    /// Parses and validates a TOML configuration. Absent keys keep their
    /// defaults; unknown keys are rejected.
    pub fn from_toml(text: &str) -> Result<ReconConfig, ReconError> {
        let config: ReconConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.tolerance_amount.is_negative() {
            return Err(ReconError::Config(
                "tolerance-amount must not be negative".to_string(),
            ));
        }
        let w = &self.weights;
        for (name, value) in [
            ("direction-bonus", w.direction_bonus),
            ("voucher-bonus", w.voucher_bonus),
            ("description-weight", w.description_weight),
            ("remarks-weight", w.remarks_weight),
            ("category-bonus", w.category_bonus),
            ("accept-threshold", w.accept_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ReconError::Config(format!(
                    "{name} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}
