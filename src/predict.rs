use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calibration::{self, MarketProbs, Outcome, Prob3};
use crate::dixon_coles::ScorelineMatrix;
use crate::edge::{self, EdgeAssessment};
use crate::elo::RatingStore;
use crate::error::EngineResult;
use crate::fixture::{Fixture, Side};
use crate::goal_rate::{self, ExpectedGoals};
use crate::market::{MarketKind, MarketPrices, Selection};
use crate::model_config::ModelConfig;
use crate::secondary;

/// One market pick for one fixture. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub fixture_id: u32,
    pub market: MarketKind,
    pub selection: Selection,
    pub prediction: String,
    /// Calibrated probability in percent, one decimal.
    pub confidence: f64,
    pub market_price: Option<f64>,
    pub edge_percent: f64,
    pub stake_recommended: bool,
    pub stake_fraction: f64,
    pub stake_percent: f64,
    pub rationale: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome_probs: Option<Prob3>,
}

/// Identity used for global uniqueness across parlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickId {
    pub fixture_id: u32,
    pub market: MarketKind,
    pub selection: Selection,
}

impl Recommendation {
    pub fn pick_id(&self) -> PickId {
        PickId {
            fixture_id: self.fixture_id,
            market: self.market,
            selection: self.selection,
        }
    }

    pub fn probability(&self) -> f64 {
        self.confidence / 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixturePrediction {
    pub fixture_id: u32,
    pub home_rating: f64,
    pub away_rating: f64,
    pub expected_goals: ExpectedGoals,
    pub probs: MarketProbs,
    pub recommendations: Vec<Recommendation>,
}

/// Runs every model for one fixture and emits exactly one recommendation per market.
pub fn predict_fixture(
    fixture: &Fixture,
    ratings: &RatingStore,
    prices: Option<&MarketPrices>,
    cfg: &ModelConfig,
) -> EngineResult<FixturePrediction> {
    let (home_rating, away_rating) = ratings.pair(fixture)?;
    let xg = goal_rate::expected_goals(
        fixture,
        home_rating,
        away_rating,
        &cfg.goals,
        cfg.ratings.scale,
    );

    let goals = ScorelineMatrix::build(xg.home, xg.away, &cfg.goals).markets();
    let rating = secondary::rating_probs(home_rating, away_rating, &cfg.ratings);
    let form = secondary::form_probs(
        fixture.points_last5(Side::Home),
        fixture.points_last5(Side::Away),
        &cfg.form,
    );
    let raw = calibration::blend(&goals, rating, form, cfg.blend);
    let probs = calibration::calibrate(&raw, &cfg.calibration);

    debug!(
        fixture_id = fixture.id,
        lambda_home = xg.home,
        lambda_away = xg.away,
        p_home = probs.outcome.home,
        p_draw = probs.outcome.draw,
        p_away = probs.outcome.away,
        "fixture probabilities"
    );

    let composer = Composer {
        fixture,
        prices,
        cfg,
        probs: &probs,
        xg,
    };
    let recommendations = vec![
        composer.match_result(),
        composer.both_teams_score(),
        composer.total_goals(),
        composer.double_chance(),
        composer.asian_handicap(),
    ];

    Ok(FixturePrediction {
        fixture_id: fixture.id,
        home_rating,
        away_rating,
        expected_goals: xg,
        probs,
        recommendations,
    })
}

struct Composer<'a> {
    fixture: &'a Fixture,
    prices: Option<&'a MarketPrices>,
    cfg: &'a ModelConfig,
    probs: &'a MarketProbs,
    xg: ExpectedGoals,
}

impl Composer<'_> {
    fn price(&self, selection: Selection) -> Option<f64> {
        self.prices.and_then(|p| p.price_for(selection))
    }

    fn build(
        &self,
        selection: Selection,
        probability: f64,
        price: Option<f64>,
        model: &str,
        detail: Option<String>,
    ) -> Recommendation {
        let probability = probability.clamp(0.0, 1.0);
        let assessment = edge::assess(probability, price, &self.cfg.staking);
        self.record(selection, probability, price, assessment, model, detail)
    }

    fn record(
        &self,
        selection: Selection,
        probability: f64,
        price: Option<f64>,
        assessment: EdgeAssessment,
        model: &str,
        detail: Option<String>,
    ) -> Recommendation {
        Recommendation {
            fixture_id: self.fixture.id,
            market: selection.market(),
            selection,
            prediction: selection.describe(&self.fixture.home, &self.fixture.away),
            confidence: round1(probability * 100.0),
            market_price: price,
            edge_percent: round1(assessment.edge_percent()),
            stake_recommended: assessment.recommended,
            stake_fraction: assessment.stake,
            stake_percent: round1(assessment.stake * 100.0),
            rationale: assessment.reason,
            model: model.to_string(),
            detail,
            outcome_probs: None,
        }
    }

    fn match_result(&self) -> Recommendation {
        let p = self.probs.outcome;
        let outcome = p.argmax();
        let selection = match outcome {
            Outcome::Home => Selection::Home,
            Outcome::Draw => Selection::Draw,
            Outcome::Away => Selection::Away,
        };
        let mut rec = self.build(
            selection,
            p.get(outcome),
            self.price(selection),
            "Poisson-DC + ELO + Form",
            None,
        );
        rec.outcome_probs = Some(Prob3::new(
            round1(p.home * 100.0),
            round1(p.draw * 100.0),
            round1(p.away * 100.0),
        ));
        rec
    }

    fn both_teams_score(&self) -> Recommendation {
        let p = self.probs.btts;
        let detail = format!(
            "xG: {} {:.1} - {:.1} {}",
            short_name(&self.fixture.home),
            self.xg.home,
            self.xg.away,
            short_name(&self.fixture.away)
        );
        // No price is modelled for the "no" side.
        if p > 0.5 {
            let price = self.price(Selection::BttsYes);
            self.build(Selection::BttsYes, p, price, "Poisson-Dixon-Coles", Some(detail))
        } else {
            self.build(Selection::BttsNo, 1.0 - p, None, "Poisson-Dixon-Coles", Some(detail))
        }
    }

    fn total_goals(&self) -> Recommendation {
        let p = self.probs.over_2_5;
        let detail = format!("expected total: {:.2} goals", self.xg.total());
        if p > 0.5 {
            let price = self.price(Selection::Over25);
            self.build(Selection::Over25, p, price, "Poisson goal distribution", Some(detail))
        } else {
            self.build(Selection::Under25, 1.0 - p, None, "Poisson goal distribution", Some(detail))
        }
    }

    // No price source exists for double chance or the handicap proxy, so
    // both are informational only.
    fn double_chance(&self) -> Recommendation {
        let p = self.probs.outcome;
        let home_side = p.home + p.draw;
        let away_side = p.away + p.draw;
        let (selection, probability) = if home_side >= away_side {
            (Selection::HomeOrDraw, home_side)
        } else {
            (Selection::AwayOrDraw, away_side)
        };
        self.record(
            selection,
            probability.clamp(0.0, 1.0),
            None,
            EdgeAssessment::no_price(),
            "Combined probability",
            Some("hedge pick (no market price)".to_string()),
        )
    }

    fn asian_handicap(&self) -> Recommendation {
        let h = self.cfg.handicap;
        let p = self.probs.outcome;
        let diff = self.xg.diff();
        let (selection, probability) = if diff.abs() > h.goal_diff_threshold {
            if diff > 0.0 {
                (Selection::HomeMinusOne, p.home * h.favourite_factor)
            } else {
                (Selection::AwayMinusOne, p.away * h.favourite_factor)
            }
        } else {
            (Selection::DrawNoBet, p.draw * h.draw_factor)
        };
        self.record(
            selection,
            probability.min(h.max_confidence).clamp(0.0, 1.0),
            None,
            EdgeAssessment::no_price(),
            "xG differential",
            Some(format!("expected goal difference: {diff:+.2}")),
        )
    }
}

fn short_name(team: &str) -> String {
    team.chars().take(3).collect()
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
