use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::fixture::{Fixture, Side};
use crate::model_config::RatingConfig;

/// Team strength ratings seeded once from table position. Read-only after
/// construction, so a shared reference is safe to hand to worker threads.
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    ratings: HashMap<String, f64>,
}

impl RatingStore {
    pub fn from_fixtures(fixtures: &[Fixture], cfg: &RatingConfig) -> Self {
        let mut ratings: HashMap<String, f64> = HashMap::new();
        for f in fixtures {
            for side in [Side::Home, Side::Away] {
                // First sighting wins; later positions for the same team are ignored.
                ratings
                    .entry(f.team(side).to_string())
                    .or_insert_with(|| seed_rating(f.position(side), cfg));
            }
        }
        Self { ratings }
    }

    pub fn get(&self, team: &str) -> Option<f64> {
        self.ratings.get(team).copied()
    }

    pub fn rating(&self, team: &str) -> EngineResult<f64> {
        self.get(team).ok_or_else(|| EngineError::UnknownTeam {
            team: team.to_string(),
        })
    }

    pub fn pair(&self, fixture: &Fixture) -> EngineResult<(f64, f64)> {
        Ok((self.rating(&fixture.home)?, self.rating(&fixture.away)?))
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

pub fn seed_rating(table_position: u32, cfg: &RatingConfig) -> f64 {
    cfg.base + (cfg.table_anchor - table_position as f64) * cfg.points_per_place
}

/// Logistic expectation of `r_a` beating `r_b`.
pub fn expected_score(r_a: f64, r_b: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((r_b - r_a) / scale))
}
