use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::market::MarketPriceTable;

pub const FORM_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormResult {
    Win,
    Draw,
    Loss,
}

impl FormResult {
    // Feeds use V/E/D; W and L are accepted as well. `D` is always a loss.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'V' | 'W' => Some(FormResult::Win),
            'E' => Some(FormResult::Draw),
            'D' | 'L' => Some(FormResult::Loss),
            _ => None,
        }
    }

    pub fn points(self) -> u8 {
        match self {
            FormResult::Win => 3,
            FormResult::Draw => 1,
            FormResult::Loss => 0,
        }
    }
}

/// One fixture of the slate with the season numbers the models read.
///
/// `*_last5` holds points per match, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    #[serde(alias = "local")]
    pub home: String,
    #[serde(alias = "visitante")]
    pub away: String,
    #[serde(alias = "fecha")]
    pub date: NaiveDate,
    #[serde(alias = "hora", with = "kickoff_time")]
    pub time: NaiveTime,
    #[serde(alias = "estadio")]
    pub venue: String,
    #[serde(alias = "liga")]
    pub league: String,
    #[serde(alias = "local_pos")]
    pub home_position: u32,
    #[serde(alias = "visitante_pos")]
    pub away_position: u32,
    #[serde(alias = "local_forma")]
    pub home_form: String,
    #[serde(alias = "visitante_forma")]
    pub away_form: String,
    #[serde(alias = "local_goles_favor")]
    pub home_goals_for: u32,
    #[serde(alias = "local_goles_contra")]
    pub home_goals_against: u32,
    #[serde(alias = "visitante_goles_favor")]
    pub away_goals_for: u32,
    #[serde(alias = "visitante_goles_contra")]
    pub away_goals_against: u32,
    #[serde(alias = "local_ultimos_5")]
    pub home_last5: [u8; FORM_LEN],
    #[serde(alias = "visitante_ultimos_5")]
    pub away_last5: [u8; FORM_LEN],
}

impl Fixture {
    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn position(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_position,
            Side::Away => self.away_position,
        }
    }

    pub fn goals_for(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_goals_for,
            Side::Away => self.away_goals_for,
        }
    }

    pub fn goals_against(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_goals_against,
            Side::Away => self.away_goals_against,
        }
    }

    pub fn form(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_form,
            Side::Away => &self.away_form,
        }
    }

    pub fn last5(&self, side: Side) -> &[u8; FORM_LEN] {
        match side {
            Side::Home => &self.home_last5,
            Side::Away => &self.away_last5,
        }
    }

    pub fn points_last5(&self, side: Side) -> u32 {
        self.last5(side).iter().map(|p| u32::from(*p)).sum()
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }

    pub fn validate(&self) -> EngineResult<()> {
        for side in [Side::Home, Side::Away] {
            let team = self.team(side);
            let points = *self.last5(side);
            if points.iter().any(|p| !matches!(p, 0 | 1 | 3)) {
                return Err(EngineError::RecentPoints {
                    fixture_id: self.id,
                    team: team.to_string(),
                    points,
                });
            }

            let form = parse_form(self.id, self.form(side))?;
            let agrees = form
                .iter()
                .zip(points.iter())
                .all(|(r, p)| r.points() == *p);
            if !agrees {
                return Err(EngineError::FormMismatch {
                    fixture_id: self.id,
                    team: team.to_string(),
                    form: self.form(side).to_string(),
                    points,
                });
            }
        }
        Ok(())
    }
}

pub fn parse_form(fixture_id: u32, raw: &str) -> EngineResult<[FormResult; FORM_LEN]> {
    let trimmed = raw.trim();
    if trimmed.chars().count() != FORM_LEN {
        return Err(EngineError::FormLength {
            fixture_id,
            form: raw.to_string(),
        });
    }
    let mut out = [FormResult::Draw; FORM_LEN];
    for (slot, c) in out.iter_mut().zip(trimmed.chars()) {
        *slot = FormResult::from_char(c).ok_or_else(|| EngineError::FormChar {
            fixture_id,
            form: raw.to_string(),
            found: c,
        })?;
    }
    Ok(out)
}

/// The input document: fixtures in canonical order plus whatever prices are known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slate {
    #[serde(alias = "partidos")]
    pub fixtures: Vec<Fixture>,
    #[serde(default, alias = "cuotas")]
    pub odds: MarketPriceTable,
}

impl Slate {
    pub fn validate(&self) -> EngineResult<()> {
        let mut seen = HashSet::new();
        for fixture in &self.fixtures {
            if !seen.insert(fixture.id) {
                return Err(EngineError::DuplicateFixture {
                    fixture_id: fixture.id,
                });
            }
            fixture.validate()?;
        }
        Ok(())
    }
}

pub(crate) mod kickoff_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_fixture(id: u32) -> Fixture {
        Fixture {
            id,
            home: format!("Home {id}"),
            away: format!("Away {id}"),
            date: NaiveDate::from_ymd_opt(2026, 2, 14).unwrap(),
            time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            venue: "Stadium".to_string(),
            league: "LaLiga EA Sports".to_string(),
            home_position: 6,
            away_position: 14,
            home_form: "VEVDV".to_string(),
            away_form: "DEDED".to_string(),
            home_goals_for: 34,
            home_goals_against: 22,
            away_goals_for: 24,
            away_goals_against: 35,
            home_last5: [3, 1, 3, 0, 3],
            away_last5: [0, 1, 0, 1, 0],
        }
    }

    #[test]
    fn form_parsing_accepts_both_encodings() {
        let form = parse_form(1, "VEDWL").unwrap();
        assert_eq!(
            form,
            [
                FormResult::Win,
                FormResult::Draw,
                FormResult::Loss,
                FormResult::Win,
                FormResult::Loss
            ]
        );
    }

    #[test]
    fn form_parsing_rejects_bad_length_and_chars() {
        assert!(matches!(
            parse_form(7, "VEV"),
            Err(EngineError::FormLength { fixture_id: 7, .. })
        ));
        assert!(matches!(
            parse_form(7, "VEVXD"),
            Err(EngineError::FormChar { found: 'X', .. })
        ));
    }

    #[test]
    fn validate_checks_points_against_form() {
        let mut f = sample_fixture(3);
        assert!(f.validate().is_ok());

        f.home_last5 = [3, 1, 3, 0, 2];
        assert!(matches!(
            f.validate(),
            Err(EngineError::RecentPoints { .. })
        ));

        f.home_last5 = [3, 1, 3, 0, 1];
        assert!(matches!(
            f.validate(),
            Err(EngineError::FormMismatch { .. })
        ));
    }

    #[test]
    fn slate_rejects_duplicate_ids() {
        let slate = Slate {
            fixtures: vec![sample_fixture(1), sample_fixture(1)],
            odds: MarketPriceTable::new(),
        };
        assert_eq!(
            slate.validate(),
            Err(EngineError::DuplicateFixture { fixture_id: 1 })
        );
    }

    #[test]
    fn fixture_parses_source_field_names() {
        let raw = r#"{
            "id": 1, "local": "Elche CF", "visitante": "CA Osasuna",
            "fecha": "2026-02-13", "hora": "21:00", "estadio": "Martínez Valero",
            "liga": "LaLiga EA Sports", "local_pos": 12, "visitante_pos": 14,
            "local_forma": "EDEED", "visitante_forma": "DEEED",
            "local_goles_favor": 28, "local_goles_contra": 32,
            "visitante_goles_favor": 24, "visitante_goles_contra": 35,
            "local_ultimos_5": [1, 0, 1, 1, 0], "visitante_ultimos_5": [0, 1, 1, 1, 0]
        }"#;
        let f: Fixture = serde_json::from_str(raw).unwrap();
        assert_eq!(f.home, "Elche CF");
        assert_eq!(f.time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(f.points_last5(Side::Away), 3);
        assert!(f.validate().is_ok());
    }
}
