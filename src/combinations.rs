//! Greedy parlay allocation over the qualifying picks of a report.
//!
//! Strategies run strictly in order against one shared set of used picks, so
//! a pick lands in at most one parlay per run and a parlay never holds two
//! picks from the same fixture. A strategy that cannot be filled is skipped;
//! there is no backtracking.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::edge;
use crate::error::{EngineError, EngineResult};
use crate::market::{MarketKind, Selection};
use crate::model_config::StakingConfig;
use crate::predict::{PickId, Recommendation};
use crate::report::{FixtureReport, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    Safe,
    Medium,
    MediumHigh,
    High,
    UltraHigh,
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskCategory::Safe => "safe",
            RiskCategory::Medium => "medium",
            RiskCategory::MediumHigh => "medium-high",
            RiskCategory::High => "high",
            RiskCategory::UltraHigh => "ultra-high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub legs: usize,
    pub category: RiskCategory,
}

impl Strategy {
    pub fn new(name: &str, legs: usize, category: RiskCategory) -> Self {
        Self {
            name: name.to_string(),
            legs,
            category,
        }
    }
}

pub fn default_strategies() -> Vec<Strategy> {
    use RiskCategory::*;
    vec![
        Strategy::new("Value Safe", 3, Safe),
        Strategy::new("Medium Value", 4, Medium),
        Strategy::new("Quick Win", 3, Safe),
        Strategy::new("Power Combo", 5, Medium),
        Strategy::new("Smart Pick", 4, Medium),
        Strategy::new("High Stakes", 6, High),
        Strategy::new("Risk-Reward", 5, MediumHigh),
        Strategy::new("Monster Combo", 7, UltraHigh),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    /// Percent, inclusive.
    pub min_confidence: f64,
    /// Below this many qualifying picks nothing is allocated.
    pub min_pool: usize,
    pub staking: StakingConfig,
    pub strategies: Vec<Strategy>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 70.0,
            min_pool: 3,
            staking: StakingConfig::default(),
            strategies: default_strategies(),
        }
    }
}

impl AllocatorConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(s) = self.strategies.iter().find(|s| s.legs == 0) {
            return Err(EngineError::Config(format!(
                "strategy {:?} needs at least one leg",
                s.name
            )));
        }
        if self.staking.kelly_fraction < 0.0 || self.staking.max_stake < 0.0 {
            return Err(EngineError::Config(
                "parlay staking fractions must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// A qualifying pick plus the fixture context shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub fixture_id: u32,
    pub market: MarketKind,
    pub selection: Selection,
    pub fixture: String,
    pub competition: String,
    pub prediction: String,
    pub price: f64,
    pub confidence: f64,
    pub date: NaiveDate,
    #[serde(with = "crate::fixture::kickoff_time")]
    pub time: NaiveTime,
}

impl Leg {
    fn from_pick(fixture: &FixtureReport, pick: &Recommendation, price: f64) -> Self {
        Self {
            fixture_id: pick.fixture_id,
            market: pick.market,
            selection: pick.selection,
            fixture: fixture.label(),
            competition: fixture.league.clone(),
            prediction: pick.prediction.clone(),
            price,
            confidence: pick.confidence,
            date: fixture.date,
            time: fixture.time,
        }
    }

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParlayStatus {
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parlay {
    pub id: String,
    pub name: String,
    pub strategy: String,
    pub category: RiskCategory,
    pub legs: Vec<Leg>,
    pub combined_price: f64,
    pub combined_probability: f64,
    pub expected_roi: f64,
    pub kelly_percent: f64,
    /// Mean leg confidence minus 50, in points.
    pub average_edge: f64,
    pub status: ParlayStatus,
    pub created_at: DateTime<Utc>,
}

impl Parlay {
    fn build(
        seq: usize,
        strategy: &Strategy,
        legs: Vec<Leg>,
        staking: &StakingConfig,
        created_at: DateTime<Utc>,
    ) -> Self {
        let combined_price: f64 = legs.iter().map(|l| l.price).product();
        let combined_probability: f64 = legs.iter().map(Leg::probability).product();
        let mean_confidence =
            legs.iter().map(|l| l.confidence).sum::<f64>() / legs.len().max(1) as f64;

        Self {
            id: format!("comb_{seq:03}"),
            name: format!("{} - price {:.2}", strategy.name, combined_price),
            strategy: strategy.name.clone(),
            category: strategy.category,
            combined_price,
            combined_probability,
            expected_roi: (combined_price - 1.0) * combined_probability,
            kelly_percent: edge::capped_kelly(combined_probability, combined_price, staking)
                * 100.0,
            average_edge: mean_confidence - 50.0,
            status: ParlayStatus::Pending,
            created_at,
            legs,
        }
    }

    pub fn pick_ids(&self) -> impl Iterator<Item = PickId> + '_ {
        self.legs.iter().map(Leg::pick_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NotEnoughPicks { available: usize, required: usize },
    NotEnoughFixtures { available: usize, required: usize },
    PoolTooSmall { available: usize, minimum: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotEnoughPicks {
                available,
                required,
            } => write!(f, "{available} unused picks, {required} needed"),
            SkipReason::NotEnoughFixtures {
                available,
                required,
            } => write!(f, "{available} distinct fixtures, {required} needed"),
            SkipReason::PoolTooSmall { available, minimum } => {
                write!(f, "pool of {available} below minimum {minimum}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStrategy {
    pub strategy: String,
    pub legs: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CombinationStats {
    pub total: usize,
    pub total_legs: usize,
    pub min_price: f64,
    pub max_price: f64,
    pub average_probability: f64,
    pub average_expected_roi: f64,
}

impl CombinationStats {
    pub fn from_parlays(parlays: &[Parlay]) -> Self {
        if parlays.is_empty() {
            return Self::default();
        }
        let n = parlays.len() as f64;
        let prices = parlays.iter().map(|p| p.combined_price);
        Self {
            total: parlays.len(),
            total_legs: parlays.iter().map(|p| p.legs.len()).sum(),
            min_price: prices.clone().fold(f64::INFINITY, f64::min),
            max_price: prices.fold(f64::NEG_INFINITY, f64::max),
            average_probability: parlays.iter().map(|p| p.combined_probability).sum::<f64>() / n,
            average_expected_roi: parlays.iter().map(|p| p.expected_roi).sum::<f64>() / n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub generated_at: DateTime<Utc>,
    pub pool_size: usize,
    pub parlays: Vec<Parlay>,
    pub skipped: Vec<SkippedStrategy>,
    pub stats: CombinationStats,
}

pub fn qualifies(pick: &Recommendation, cfg: &AllocatorConfig) -> bool {
    pick.confidence >= cfg.min_confidence
        && pick.stake_recommended
        && pick.market_price.is_some_and(|p| p > 1.0)
}

/// Qualifying picks across the whole report, highest confidence first.
/// Equal confidences keep report order.
pub fn qualifying_pool(report: &Report, cfg: &AllocatorConfig) -> Vec<Leg> {
    let mut pool: Vec<Leg> = report
        .fixtures()
        .flat_map(|(_, fixture)| {
            fixture.picks.iter().filter_map(move |pick| {
                if !qualifies(pick, cfg) {
                    return None;
                }
                let price = pick.market_price?;
                Some(Leg::from_pick(fixture, pick, price))
            })
        })
        .collect();
    pool.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    pool
}

pub fn allocate(report: &Report, cfg: &AllocatorConfig) -> EngineResult<Allocation> {
    cfg.validate()?;
    Ok(allocate_pool(qualifying_pool(report, cfg), cfg, Utc::now()))
}

/// Runs every strategy in order over an already sorted pool.
pub fn allocate_pool(pool: Vec<Leg>, cfg: &AllocatorConfig, now: DateTime<Utc>) -> Allocation {
    let pool_size = pool.len();
    let mut parlays = Vec::new();
    let mut skipped = Vec::new();

    if pool_size < cfg.min_pool {
        warn!(
            pool = pool_size,
            minimum = cfg.min_pool,
            "qualifying pool too small, no parlays"
        );
        skipped = cfg
            .strategies
            .iter()
            .map(|s| SkippedStrategy {
                strategy: s.name.clone(),
                legs: s.legs,
                reason: SkipReason::PoolTooSmall {
                    available: pool_size,
                    minimum: cfg.min_pool,
                },
            })
            .collect();
        return Allocation {
            generated_at: now,
            pool_size,
            parlays,
            skipped,
            stats: CombinationStats::default(),
        };
    }

    let mut used: HashSet<PickId> = HashSet::new();
    for strategy in &cfg.strategies {
        match pick_legs(&pool, &used, strategy.legs) {
            Ok(legs) => {
                used.extend(legs.iter().map(Leg::pick_id));
                let parlay = Parlay::build(
                    parlays.len() + 1,
                    strategy,
                    legs,
                    &cfg.staking,
                    now,
                );
                info!(
                    id = %parlay.id,
                    strategy = %strategy.name,
                    category = %strategy.category,
                    legs = parlay.legs.len(),
                    price = parlay.combined_price,
                    probability = parlay.combined_probability,
                    "parlay built"
                );
                parlays.push(parlay);
            }
            Err(reason) => {
                warn!(strategy = %strategy.name, %reason, "strategy skipped");
                skipped.push(SkippedStrategy {
                    strategy: strategy.name.clone(),
                    legs: strategy.legs,
                    reason,
                });
            }
        }
    }

    let stats = CombinationStats::from_parlays(&parlays);
    Allocation {
        generated_at: now,
        pool_size,
        parlays,
        skipped,
        stats,
    }
}

fn pick_legs(pool: &[Leg], used: &HashSet<PickId>, target: usize) -> Result<Vec<Leg>, SkipReason> {
    let candidates: Vec<&Leg> = pool.iter().filter(|l| !used.contains(&l.pick_id())).collect();
    if candidates.len() < target {
        return Err(SkipReason::NotEnoughPicks {
            available: candidates.len(),
            required: target,
        });
    }
    let fixtures: HashSet<u32> = candidates.iter().map(|l| l.fixture_id).collect();
    if fixtures.len() < target {
        return Err(SkipReason::NotEnoughFixtures {
            available: fixtures.len(),
            required: target,
        });
    }

    let mut taken: HashSet<u32> = HashSet::with_capacity(target);
    let mut legs = Vec::with_capacity(target);
    for leg in candidates {
        if legs.len() == target {
            break;
        }
        if taken.insert(leg.fixture_id) {
            legs.push(leg.clone());
        }
    }
    Ok(legs)
}
