use serde::{Deserialize, Serialize};

use crate::dixon_coles::GoalMarkets;
use crate::model_config::{BlendWeights, CalibrationConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn new(home: f64, draw: f64, away: f64) -> Self {
        Self { home, draw, away }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn uniform() -> Self {
        Self::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }

    pub fn sum(&self) -> f64 {
        self.home + self.draw + self.away
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    /// Rescale to sum to 1; a degenerate triple falls back to uniform.
    pub fn normalized(self) -> Self {
        let sum = self.sum();
        if sum > 0.0 && sum.is_finite() {
            Self::new(self.home / sum, self.draw / sum, self.away / sum)
        } else {
            Self::uniform()
        }
    }

    /// Highest outcome; ties resolve home, then draw, then away.
    pub fn argmax(&self) -> Outcome {
        if self.home >= self.draw && self.home >= self.away {
            Outcome::Home
        } else if self.draw >= self.away {
            Outcome::Draw
        } else {
            Outcome::Away
        }
    }
}

/// Calibrated probabilities for every market the composer reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketProbs {
    pub outcome: Prob3,
    pub btts: f64,
    pub over_2_5: f64,
}

/// Fixed-weight mix of the three 1X2 estimates. Goal markets only exist in the
/// scoreline model, so they pass through untouched.
pub fn blend(goals: &GoalMarkets, rating: Prob3, form: Prob3, w: BlendWeights) -> MarketProbs {
    let mix = |g: f64, r: f64, f: f64| w.goals * g + w.rating * r + w.form * f;
    MarketProbs {
        outcome: Prob3::new(
            mix(goals.outcome.home, rating.home, form.home),
            mix(goals.outcome.draw, rating.draw, form.draw),
            mix(goals.outcome.away, rating.away, form.away),
        ),
        btts: goals.btts,
        over_2_5: goals.over_2_5,
    }
}

/// Piecewise-linear squash that pulls extreme probabilities towards the middle.
pub fn calibrate_value(p: f64, cfg: &CalibrationConfig) -> f64 {
    let out = if p > cfg.upper {
        cfg.upper_base + (p - cfg.upper) * cfg.tail_slope
    } else if p < cfg.lower {
        cfg.lower_base + p * cfg.tail_slope
    } else {
        p * cfg.mid_slope + cfg.mid_offset
    };
    out.clamp(0.0, 1.0)
}

pub fn calibrate(raw: &MarketProbs, cfg: &CalibrationConfig) -> MarketProbs {
    let outcome = Prob3::new(
        calibrate_value(raw.outcome.home, cfg),
        calibrate_value(raw.outcome.draw, cfg),
        calibrate_value(raw.outcome.away, cfg),
    )
    .normalized();
    MarketProbs {
        outcome,
        btts: calibrate_value(raw.btts, cfg),
        over_2_5: calibrate_value(raw.over_2_5, cfg),
    }
}
