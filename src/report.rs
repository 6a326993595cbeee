use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::elo::RatingStore;
use crate::error::EngineResult;
use crate::fixture::{Fixture, Slate};
use crate::model_config::ModelConfig;
use crate::predict::{self, FixturePrediction, Recommendation, round1};

pub const MODEL_VERSION: &str = "2.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    Sequential,
    #[default]
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
    pub model: String,
    pub tiers: Vec<CompetitionTier>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionTier {
    pub name: String,
    pub total_fixtures: usize,
    pub fixtures: Vec<FixtureReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureReport {
    pub id: u32,
    pub home: String,
    pub away: String,
    pub date: NaiveDate,
    #[serde(with = "crate::fixture::kickoff_time")]
    pub time: NaiveTime,
    pub venue: String,
    pub league: String,
    pub picks: Vec<Recommendation>,
    pub stats: FixtureStats,
}

impl FixtureReport {
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureStats {
    pub home_position: u32,
    pub away_position: u32,
    pub home_form: String,
    pub away_form: String,
    pub home_goals_for: u32,
    pub home_goals_against: u32,
    pub away_goals_for: u32,
    pub away_goals_against: u32,
    pub home_rating: i64,
    pub away_rating: i64,
    pub expected_goals_home: f64,
    pub expected_goals_away: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub fixtures_analyzed: usize,
    pub total_picks: usize,
    pub staked_picks: usize,
    pub picks_without_edge: usize,
    pub average_confidence: f64,
    pub expected_roi_percent: f64,
}

impl Report {
    /// All fixtures in report order (tier by tier).
    pub fn fixtures(&self) -> impl Iterator<Item = (&CompetitionTier, &FixtureReport)> + '_ {
        self.tiers
            .iter()
            .flat_map(|tier| tier.fixtures.iter().map(move |f| (tier, f)))
    }

    pub fn recommendations(&self) -> impl Iterator<Item = &Recommendation> + '_ {
        self.fixtures().flat_map(|(_, f)| f.picks.iter())
    }
}

pub fn generate_report(slate: &Slate, cfg: &ModelConfig, exec: Execution) -> EngineResult<Report> {
    generate_report_at(slate, cfg, exec, Utc::now())
}

pub fn generate_report_at(
    slate: &Slate,
    cfg: &ModelConfig,
    exec: Execution,
    generated_at: DateTime<Utc>,
) -> EngineResult<Report> {
    cfg.validate()?;
    slate.validate()?;

    // Seeded in full before any fixture is scored; read-only from here on.
    let ratings = RatingStore::from_fixtures(&slate.fixtures, &cfg.ratings);
    let predict_one =
        |f: &Fixture| predict::predict_fixture(f, &ratings, slate.odds.for_fixture(f.id), cfg);

    let predictions: Vec<FixturePrediction> = match exec {
        Execution::Sequential => slate
            .fixtures
            .iter()
            .map(predict_one)
            .collect::<EngineResult<_>>()?,
        // Indexed collect keeps canonical fixture order.
        Execution::Parallel => slate
            .fixtures
            .par_iter()
            .map(predict_one)
            .collect::<EngineResult<_>>()?,
    };

    let mut tiers: Vec<CompetitionTier> = Vec::new();
    for (fixture, prediction) in slate.fixtures.iter().zip(predictions) {
        let row = fixture_report(fixture, prediction);
        match tiers.iter_mut().find(|t| t.name == fixture.league) {
            Some(tier) => tier.fixtures.push(row),
            None => tiers.push(CompetitionTier {
                name: fixture.league.clone(),
                total_fixtures: 0,
                fixtures: vec![row],
            }),
        }
    }
    for tier in &mut tiers {
        tier.total_fixtures = tier.fixtures.len();
    }

    let summary = summarize(
        slate.fixtures.len(),
        tiers.iter().flat_map(|t| t.fixtures.iter()).flat_map(|f| f.picks.iter()),
    );
    info!(
        fixtures = summary.fixtures_analyzed,
        picks = summary.total_picks,
        staked = summary.staked_picks,
        avg_confidence = summary.average_confidence,
        "report generated"
    );

    Ok(Report {
        generated_at,
        model_version: MODEL_VERSION.to_string(),
        model: format!(
            "Poisson-DC ({:.0}%) + ELO ({:.0}%) + Form ({:.0}%)",
            cfg.blend.goals * 100.0,
            cfg.blend.rating * 100.0,
            cfg.blend.form * 100.0
        ),
        tiers,
        summary,
    })
}

fn fixture_report(fixture: &Fixture, prediction: FixturePrediction) -> FixtureReport {
    FixtureReport {
        id: fixture.id,
        home: fixture.home.clone(),
        away: fixture.away.clone(),
        date: fixture.date,
        time: fixture.time,
        venue: fixture.venue.clone(),
        league: fixture.league.clone(),
        stats: FixtureStats {
            home_position: fixture.home_position,
            away_position: fixture.away_position,
            home_form: fixture.home_form.clone(),
            away_form: fixture.away_form.clone(),
            home_goals_for: fixture.home_goals_for,
            home_goals_against: fixture.home_goals_against,
            away_goals_for: fixture.away_goals_for,
            away_goals_against: fixture.away_goals_against,
            home_rating: prediction.home_rating.round() as i64,
            away_rating: prediction.away_rating.round() as i64,
            expected_goals_home: round2(prediction.expected_goals.home),
            expected_goals_away: round2(prediction.expected_goals.away),
        },
        picks: prediction.recommendations,
    }
}

pub fn summarize<'a>(
    fixtures: usize,
    picks: impl Iterator<Item = &'a Recommendation>,
) -> ReportSummary {
    let mut total = 0usize;
    let mut staked = 0usize;
    let mut confidence_sum = 0.0_f64;
    let mut ev_sum = 0.0_f64;

    for pick in picks {
        total += 1;
        confidence_sum += pick.confidence;
        if !pick.stake_recommended {
            continue;
        }
        staked += 1;
        if let Some(price) = pick.market_price {
            ev_sum += pick.probability() * price - 1.0;
        }
    }

    ReportSummary {
        fixtures_analyzed: fixtures,
        total_picks: total,
        staked_picks: staked,
        picks_without_edge: total - staked,
        average_confidence: if total > 0 {
            round1(confidence_sum / total as f64)
        } else {
            0.0
        },
        expected_roi_percent: if staked > 0 {
            round1(ev_sum / staked as f64 * 100.0)
        } else {
            0.0
        },
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::tests::sample_fixture;
    use crate::market::{MarketKind, MarketPriceTable, MarketPrices, Selection};

    fn slate() -> Slate {
        let mut second = sample_fixture(2);
        second.league = "LaLiga Hypermotion".to_string();
        let mut third = sample_fixture(3);
        third.home_goals_for = 20;
        let odds: MarketPriceTable = [(
            1,
            MarketPrices {
                home: Some(1.6),
                draw: Some(4.0),
                away: Some(5.5),
                btts_yes: Some(1.7),
                over_2_5: Some(1.65),
            },
        )]
        .into_iter()
        .collect();
        Slate {
            fixtures: vec![sample_fixture(1), second, third],
            odds,
        }
    }

    #[test]
    fn groups_by_league_in_first_appearance_order() {
        let report =
            generate_report(&slate(), &ModelConfig::default(), Execution::Sequential).unwrap();
        let names: Vec<&str> = report.tiers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["LaLiga EA Sports", "LaLiga Hypermotion"]);
        let ids: Vec<u32> = report.tiers[0].fixtures.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(report.tiers[0].total_fixtures, 2);
        assert_eq!(report.summary.fixtures_analyzed, 3);
        assert_eq!(report.summary.total_picks, 15);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let cfg = ModelConfig::default();
        let now = Utc::now();
        let seq = generate_report_at(&slate(), &cfg, Execution::Sequential, now).unwrap();
        let par = generate_report_at(&slate(), &cfg, Execution::Parallel, now).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn summary_counts_only_priced_edges() {
        let report =
            generate_report(&slate(), &ModelConfig::default(), Execution::Sequential).unwrap();
        let staked: Vec<&Recommendation> =
            report.recommendations().filter(|r| r.stake_recommended).collect();
        assert_eq!(report.summary.staked_picks, staked.len());
        assert!(staked.iter().all(|r| r.fixture_id == 1 && r.market_price.is_some()));
        assert_eq!(
            report.summary.picks_without_edge,
            report.summary.total_picks - staked.len()
        );
    }

    #[test]
    fn summary_roi_is_mean_expected_value() {
        let pick = |confidence: f64, price: Option<f64>, staked: bool| Recommendation {
            fixture_id: 1,
            market: MarketKind::MatchResult,
            selection: Selection::Home,
            prediction: "x".to_string(),
            confidence,
            market_price: price,
            edge_percent: 0.0,
            stake_recommended: staked,
            stake_fraction: 0.0,
            stake_percent: 0.0,
            rationale: String::new(),
            model: String::new(),
            detail: None,
            outcome_probs: None,
        };
        let picks = [
            pick(60.0, Some(2.0), true),
            pick(50.0, Some(2.4), true),
            pick(80.0, None, false),
        ];
        let s = summarize(1, picks.iter());
        assert_eq!(s.total_picks, 3);
        assert_eq!(s.staked_picks, 2);
        assert_eq!(s.average_confidence, 63.3);
        // (0.2 + 0.2) / 2
        assert_eq!(s.expected_roi_percent, 20.0);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let s = summarize(0, std::iter::empty());
        assert_eq!(s.average_confidence, 0.0);
        assert_eq!(s.expected_roi_percent, 0.0);
    }

    #[test]
    fn invalid_fixture_fails_the_run() {
        let mut bad = slate();
        bad.fixtures[1].away_form = "VV".to_string();
        assert!(generate_report(&bad, &ModelConfig::default(), Execution::Parallel).is_err());
    }
}
