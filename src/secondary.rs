use crate::calibration::Prob3;
use crate::elo::expected_score;
use crate::model_config::{FormModelConfig, RatingConfig};

/// Rating-only 1X2: logistic home expectation, its complement for the away
/// side and a flat draw weight, renormalised.
pub fn rating_probs(home_rating: f64, away_rating: f64, cfg: &RatingConfig) -> Prob3 {
    let home = expected_score(home_rating, away_rating, cfg.scale);
    Prob3::new(home, cfg.draw_prob, 1.0 - home).normalized()
}

/// Form-only 1X2 from points over the last five matches.
pub fn form_probs(home_points: u32, away_points: u32, cfg: &FormModelConfig) -> Prob3 {
    Prob3::new(
        home_points as f64 + cfg.win_prior,
        cfg.draw_smoothing,
        away_points as f64 + cfg.win_prior,
    )
    .normalized()
}
