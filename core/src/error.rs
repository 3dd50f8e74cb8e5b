use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid file: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("Division '{code}' not found")]
    UnknownDivision { code: String },

    #[error("Team '{team_id}' not found")]
    UnknownTeam { team_id: String },

    #[error("The cup unlocks once the first season has been closed")]
    CupLocked,

    #[error("Cup needs at least 2 teams, found {found}")]
    NotEnoughCupTeams { found: usize },

    #[error("Rating must be a number between 40 and 99, got {rating}")]
    InvalidRating { rating: f64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
