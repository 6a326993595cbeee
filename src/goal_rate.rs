use crate::fixture::{Fixture, Side};
use crate::model_config::GoalModelConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

impl ExpectedGoals {
    pub fn total(&self) -> f64 {
        self.home + self.away
    }

    pub fn diff(&self) -> f64 {
        self.home - self.away
    }
}

/// Expected goals for both sides from season rates, recent form, rating gap
/// and table position. Each side is clamped to the configured lambda range.
pub fn expected_goals(
    fixture: &Fixture,
    home_rating: f64,
    away_rating: f64,
    cfg: &GoalModelConfig,
    rating_scale: f64,
) -> ExpectedGoals {
    let rating_diff = (home_rating - away_rating) / rating_scale;
    ExpectedGoals {
        home: side_lambda(fixture, Side::Home, rating_diff, cfg),
        away: side_lambda(fixture, Side::Away, -rating_diff, cfg),
    }
}

fn side_lambda(fixture: &Fixture, side: Side, rating_diff: f64, cfg: &GoalModelConfig) -> f64 {
    let per_match = cfg.matches_played.max(1e-9);
    let home_adv = match side {
        Side::Home => cfg.home_advantage,
        Side::Away => 1.0,
    };

    let attack = fixture.goals_for(side) as f64 / per_match * home_adv;
    let defense = fixture.goals_against(side.opponent()) as f64 / per_match;
    let form = weighted_form(fixture.last5(side), &cfg.form_decay);
    let position = 1.0 + (cfg.position_pivot - fixture.position(side) as f64) * cfg.position_step;

    let lambda = attack
        * defense
        * cfg.league_avg_goals
        * (1.0 + form * cfg.form_weight)
        * (1.0 + rating_diff * cfg.rating_weight)
        * position
        * 0.5;
    lambda.clamp(cfg.lambda_min, cfg.lambda_max)
}

/// Decay-weighted mean of recent points, weights aligned oldest first.
pub fn weighted_form(points: &[u8; 5], decay: &[f64; 5]) -> f64 {
    let weight_sum: f64 = decay.iter().sum();
    if weight_sum <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = points
        .iter()
        .zip(decay)
        .map(|(p, w)| f64::from(*p) * w)
        .sum();
    weighted / weight_sum
}
