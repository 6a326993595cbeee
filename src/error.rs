use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("fixture {fixture_id}: form string {form:?} must have exactly 5 results")]
    FormLength { fixture_id: u32, form: String },

    #[error("fixture {fixture_id}: unknown form result {found:?} in {form:?}")]
    FormChar {
        fixture_id: u32,
        form: String,
        found: char,
    },

    #[error("fixture {fixture_id}: {team} recent points {points:?} may only contain 0, 1 or 3")]
    RecentPoints {
        fixture_id: u32,
        team: String,
        points: [u8; 5],
    },

    #[error("fixture {fixture_id}: {team} form {form:?} disagrees with recent points {points:?}")]
    FormMismatch {
        fixture_id: u32,
        team: String,
        form: String,
        points: [u8; 5],
    },

    #[error("fixture {fixture_id} appears more than once in the slate")]
    DuplicateFixture { fixture_id: u32 },

    #[error("team {team:?} has no rating")]
    UnknownTeam { team: String },

    #[error("invalid model config: {0}")]
    Config(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
