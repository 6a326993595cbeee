use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    MatchResult,
    BothTeamsScore,
    TotalGoals,
    DoubleChance,
    AsianHandicap,
}

impl MarketKind {
    pub const ALL: [MarketKind; 5] = [
        MarketKind::MatchResult,
        MarketKind::BothTeamsScore,
        MarketKind::TotalGoals,
        MarketKind::DoubleChance,
        MarketKind::AsianHandicap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MarketKind::MatchResult => "Match Result (1X2)",
            MarketKind::BothTeamsScore => "Both Teams To Score",
            MarketKind::TotalGoals => "Total Goals",
            MarketKind::DoubleChance => "Double Chance",
            MarketKind::AsianHandicap => "Asian Handicap",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The side of a market a recommendation backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Home,
    Draw,
    Away,
    BttsYes,
    BttsNo,
    Over25,
    Under25,
    HomeOrDraw,
    AwayOrDraw,
    HomeMinusOne,
    AwayMinusOne,
    DrawNoBet,
}

impl Selection {
    pub fn market(self) -> MarketKind {
        match self {
            Selection::Home | Selection::Draw | Selection::Away => MarketKind::MatchResult,
            Selection::BttsYes | Selection::BttsNo => MarketKind::BothTeamsScore,
            Selection::Over25 | Selection::Under25 => MarketKind::TotalGoals,
            Selection::HomeOrDraw | Selection::AwayOrDraw => MarketKind::DoubleChance,
            Selection::HomeMinusOne | Selection::AwayMinusOne | Selection::DrawNoBet => {
                MarketKind::AsianHandicap
            }
        }
    }

    /// Human-readable pick text for a given pairing.
    pub fn describe(self, home: &str, away: &str) -> String {
        match self {
            Selection::Home => format!("{home} win"),
            Selection::Draw => "Draw".to_string(),
            Selection::Away => format!("{away} win"),
            Selection::BttsYes => "Yes".to_string(),
            Selection::BttsNo => "No".to_string(),
            Selection::Over25 => "Over 2.5".to_string(),
            Selection::Under25 => "Under 2.5".to_string(),
            Selection::HomeOrDraw => format!("{home} or Draw"),
            Selection::AwayOrDraw => format!("{away} or Draw"),
            Selection::HomeMinusOne => format!("{home} -1.0 AH"),
            Selection::AwayMinusOne => format!("{away} -1.0 AH"),
            Selection::DrawNoBet => "Draw No Bet AH 0.0".to_string(),
        }
    }
}

/// Decimal prices quoted for one fixture. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketPrices {
    #[serde(default)]
    pub home: Option<f64>,
    #[serde(default)]
    pub draw: Option<f64>,
    #[serde(default)]
    pub away: Option<f64>,
    #[serde(default)]
    pub btts_yes: Option<f64>,
    #[serde(default, alias = "over25")]
    pub over_2_5: Option<f64>,
}

impl MarketPrices {
    /// Only the home/draw/away, BTTS-yes and over-2.5 sides are ever quoted.
    pub fn price_for(&self, selection: Selection) -> Option<f64> {
        match selection {
            Selection::Home => self.home,
            Selection::Draw => self.draw,
            Selection::Away => self.away,
            Selection::BttsYes => self.btts_yes,
            Selection::Over25 => self.over_2_5,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketPriceTable {
    prices: HashMap<u32, MarketPrices>,
}

impl MarketPriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fixture_id: u32, prices: MarketPrices) {
        self.prices.insert(fixture_id, prices);
    }

    pub fn for_fixture(&self, fixture_id: u32) -> Option<&MarketPrices> {
        self.prices.get(&fixture_id)
    }

    pub fn price(&self, fixture_id: u32, selection: Selection) -> Option<f64> {
        self.for_fixture(fixture_id)
            .and_then(|p| p.price_for(selection))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(u32, MarketPrices)> for MarketPriceTable {
    fn from_iter<T: IntoIterator<Item = (u32, MarketPrices)>>(iter: T) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}
