//! Edge detection and fractional-Kelly sizing against a decimal market price.
//!
//! A bet is only ever suggested when a real price exists: a missing or
//! degenerate price (`<= 1.0`) means "no edge", never a default price.

use serde::{Deserialize, Serialize};

use crate::model_config::StakingConfig;

pub const NO_PRICE_REASON: &str = "no market price available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAssessment {
    pub has_edge: bool,
    /// Our probability minus the implied probability, as a fraction.
    pub edge: f64,
    /// Fraction of bankroll to stake, already capped.
    pub stake: f64,
    pub recommended: bool,
    pub reason: String,
}

impl EdgeAssessment {
    pub fn no_price() -> Self {
        Self {
            has_edge: false,
            edge: 0.0,
            stake: 0.0,
            recommended: false,
            reason: NO_PRICE_REASON.to_string(),
        }
    }

    pub fn edge_percent(&self) -> f64 {
        self.edge * 100.0
    }
}

/// Full-Kelly fraction `(b*p - q) / b` with `b = price - 1`. Zero when the
/// price leaves no net return.
pub fn kelly_fraction(probability: f64, price: f64) -> f64 {
    let b = price - 1.0;
    if b <= 0.0 || !b.is_finite() {
        return 0.0;
    }
    (b * probability - (1.0 - probability)) / b
}

pub fn capped_kelly(probability: f64, price: f64, cfg: &StakingConfig) -> f64 {
    (kelly_fraction(probability, price) * cfg.kelly_fraction).clamp(0.0, cfg.max_stake)
}

pub fn assess(probability: f64, price: Option<f64>, cfg: &StakingConfig) -> EdgeAssessment {
    let Some(price) = price.filter(|p| *p > 1.0 && p.is_finite()) else {
        return EdgeAssessment::no_price();
    };

    let edge = probability - 1.0 / price;
    if edge > cfg.min_edge {
        EdgeAssessment {
            has_edge: true,
            edge,
            stake: capped_kelly(probability, price, cfg),
            recommended: true,
            reason: format!("positive edge: {:.1}%", edge * 100.0),
        }
    } else {
        EdgeAssessment {
            has_edge: false,
            edge,
            stake: 0.0,
            recommended: false,
            reason: format!(
                "insufficient edge: {:.1}% < {:.0}%",
                edge * 100.0,
                cfg.min_edge * 100.0
            ),
        }
    }
}
