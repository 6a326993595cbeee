use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Every fixed constant the prediction engine reads. Built once per run and
/// passed by reference; a JSON file may override any subset of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub goals: GoalModelConfig,
    pub ratings: RatingConfig,
    pub form: FormModelConfig,
    pub blend: BlendWeights,
    pub calibration: CalibrationConfig,
    pub staking: StakingConfig,
    pub handicap: HandicapConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalModelConfig {
    // Dixon-Coles dependence parameter.
    pub rho: f64,
    pub max_goals: u32,
    pub tau_min: f64,
    pub tau_max: f64,
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub home_advantage: f64,
    pub league_avg_goals: f64,
    // Season goal totals are divided by this to get per-match rates.
    pub matches_played: f64,
    pub form_decay: [f64; 5],
    pub form_weight: f64,
    pub rating_weight: f64,
    pub position_pivot: f64,
    pub position_step: f64,
}

impl Default for GoalModelConfig {
    fn default() -> Self {
        Self {
            rho: 0.10,
            max_goals: 6,
            tau_min: 0.5,
            tau_max: 1.5,
            lambda_min: 0.3,
            lambda_max: 4.0,
            home_advantage: 1.15,
            league_avg_goals: 2.5,
            matches_played: 23.0,
            form_decay: [0.3, 0.25, 0.2, 0.15, 0.1],
            form_weight: 0.2,
            rating_weight: 0.1,
            position_pivot: 10.0,
            position_step: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub base: f64,
    pub table_anchor: f64,
    pub points_per_place: f64,
    pub scale: f64,
    pub draw_prob: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            base: 1500.0,
            table_anchor: 21.0,
            points_per_place: 20.0,
            scale: 400.0,
            draw_prob: 0.27,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormModelConfig {
    pub win_prior: f64,
    pub draw_smoothing: f64,
}

impl Default for FormModelConfig {
    fn default() -> Self {
        Self {
            win_prior: 2.0,
            draw_smoothing: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub goals: f64,
    pub rating: f64,
    pub form: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            goals: 0.5,
            rating: 0.3,
            form: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub upper: f64,
    pub upper_base: f64,
    pub lower: f64,
    pub lower_base: f64,
    pub tail_slope: f64,
    pub mid_slope: f64,
    pub mid_offset: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            upper: 0.9,
            upper_base: 0.85,
            lower: 0.1,
            lower_base: 0.1,
            tail_slope: 0.5,
            mid_slope: 0.95,
            mid_offset: 0.025,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    pub min_edge: f64,
    pub kelly_fraction: f64,
    pub max_stake: f64,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_edge: 0.02,
            kelly_fraction: 0.25,
            max_stake: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandicapConfig {
    pub goal_diff_threshold: f64,
    pub favourite_factor: f64,
    pub draw_factor: f64,
    pub max_confidence: f64,
}

impl Default for HandicapConfig {
    fn default() -> Self {
        Self {
            goal_diff_threshold: 1.0,
            favourite_factor: 0.7,
            draw_factor: 1.2,
            max_confidence: 0.85,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> EngineResult<()> {
        let g = &self.goals;
        if g.matches_played.is_nan() || g.matches_played <= 0.0 {
            return Err(EngineError::Config(format!(
                "matches_played must be positive, got {}",
                g.matches_played
            )));
        }
        if g.lambda_min.is_nan() || g.lambda_min <= 0.0 || g.lambda_min > g.lambda_max {
            return Err(EngineError::Config(format!(
                "lambda bounds [{}, {}] are not a positive range",
                g.lambda_min, g.lambda_max
            )));
        }
        if g.tau_min.is_nan() || g.tau_min < 0.0 || g.tau_min > g.tau_max {
            return Err(EngineError::Config(format!(
                "tau bounds [{}, {}] are not a non-negative range",
                g.tau_min, g.tau_max
            )));
        }
        if g.form_decay.iter().any(|w| *w < 0.0) || g.form_decay.iter().sum::<f64>() <= 0.0 {
            return Err(EngineError::Config(
                "form_decay weights must be non-negative with a positive sum".to_string(),
            ));
        }
        if self.ratings.scale.is_nan() || self.ratings.scale <= 0.0 {
            return Err(EngineError::Config("rating scale must be positive".to_string()));
        }
        let b = self.blend;
        if b.goals < 0.0 || b.rating < 0.0 || b.form < 0.0 || b.goals + b.rating + b.form <= 0.0
        {
            return Err(EngineError::Config(
                "blend weights must be non-negative with a positive sum".to_string(),
            ));
        }
        let s = self.staking;
        if s.kelly_fraction < 0.0 || s.max_stake < 0.0 {
            return Err(EngineError::Config(
                "staking fractions must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
