use crate::{
    rng::SimRng,
    snapshot::lenient,
    types::{DivisionCode, PlayerId, Round, TeamId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Season multipliers are kept inside this band so a wild draw can never
/// zero out (or double) a team's strength.
pub const SEASON_MULTIPLIER_MIN: f64 = 0.5;
pub const SEASON_MULTIPLIER_MAX: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "GK")]
    Goalkeeper,
    #[serde(rename = "DF")]
    Defender,
    #[serde(rename = "MF")]
    Midfielder,
    #[serde(rename = "FW")]
    Forward,
}

impl Position {
    /// Sigma of generated player ratings around the team rating.
    pub fn rating_spread(&self) -> f64 {
        match self {
            Self::Goalkeeper => 4.0,
            Self::Defender   => 6.0,
            Self::Midfielder => 7.0,
            Self::Forward    => 8.0,
        }
    }

    /// Base weight in the goal-scorer lottery.
    pub fn scoring_weight(&self) -> f64 {
        match self {
            Self::Goalkeeper => 0.1,
            Self::Defender   => 0.7,
            Self::Midfielder => 1.8,
            Self::Forward    => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    #[serde(default = "lenient::nan", deserialize_with = "lenient::number")]
    pub overall: f64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub goals: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub yellow_cards: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub red_cards: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub appearances: u32,
    /// First round the player is fit again.
    #[serde(default, deserialize_with = "lenient::count")]
    pub injured_until: Round,
    /// First round the player may play again.
    #[serde(default, deserialize_with = "lenient::count")]
    pub suspended_until: Round,
}

impl Player {
    pub fn new(id: PlayerId, name: String, position: Position, overall: f64) -> Self {
        Self {
            id,
            name,
            position,
            overall,
            goals: 0,
            yellow_cards: 0,
            red_cards: 0,
            appearances: 0,
            injured_until: 0,
            suspended_until: 0,
        }
    }

    pub fn is_available(&self, round: Round) -> bool {
        self.injured_until <= round && self.suspended_until <= round
    }

    pub fn clear_unavailability(&mut self) {
        self.injured_until = 0;
        self.suspended_until = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub id: TeamId,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    /// Base rating; the season multiplier scales it.
    #[serde(default = "lenient::nan", deserialize_with = "lenient::number")]
    pub rating: f64,
    /// Drawn when a season opens, cleared when it closes.
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub season_multiplier: Option<f64>,
    /// League titles keyed by division code.
    #[serde(default, deserialize_with = "lenient::counts")]
    pub titles: BTreeMap<DivisionCode, u32>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub cup_titles: u32,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(id: TeamId, name: String, rating: f64) -> Self {
        Self {
            id,
            name,
            rating,
            season_multiplier: None,
            titles: BTreeMap::new(),
            cup_titles: 0,
            players: Vec::new(),
        }
    }

    /// Base rating scaled by this season's form.
    pub fn strength(&self) -> f64 {
        self.rating * self.season_multiplier.unwrap_or(1.0)
    }

    /// Draw this season's multiplier unless one is already set.
    pub fn open_season(&mut self, rng: &mut SimRng, season_sigma: f64) {
        if self.season_multiplier.is_none() {
            let drawn = 1.0 + rng.normal(0.0, season_sigma);
            self.season_multiplier =
                Some(drawn.clamp(SEASON_MULTIPLIER_MIN, SEASON_MULTIPLIER_MAX));
        }
    }

    /// Clear everything that only lives for one season.
    pub fn close_season(&mut self) {
        self.season_multiplier = None;
        self.heal();
    }

    /// Return every player to availability.
    pub fn heal(&mut self) {
        for player in &mut self.players {
            player.clear_unavailability();
        }
    }

    pub fn record_title(&mut self, division: &str) {
        *self.titles.entry(division.to_string()).or_insert(0) += 1;
    }

    pub fn titles_in(&self, division: &str) -> u32 {
        self.titles.get(division).copied().unwrap_or(0)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }
}
