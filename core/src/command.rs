use serde::{Deserialize, Serialize};
use crate::{
    config::{ConfigPatch, DEFAULT_CUP_INTAKE},
    types::{DivisionCode, TeamId},
};

fn default_cup_intake() -> usize {
    DEFAULT_CUP_INTAKE
}

/// Every command the engine accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum LeagueCommand {
    // ── League play ───────────────────────────────
    PlayNextRound { division: DivisionCode },
    PlayAllRounds { division: DivisionCode },
    PlayNextRoundAll,
    PlayAllDivisions,
    CloseSeason,
    RegenerateFixtures { division: DivisionCode },

    // ── Cup ───────────────────────────────────────
    SeedCup {
        #[serde(default = "default_cup_intake")]
        per_division: usize,
    },
    PlayCupRound,
    PlayCupAll,

    // ── Administration ────────────────────────────
    HealAll,
    SetConfig(ConfigPatch),
    SetTeamRating { team_id: TeamId, rating: f64 },
    AddTeam { division: DivisionCode, name: String, rating: f64 },
    RemoveTeam { team_id: TeamId },
}

impl LeagueCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlayNextRound { .. }      => "play_next_round",
            Self::PlayAllRounds { .. }      => "play_all_rounds",
            Self::PlayNextRoundAll          => "play_next_round_all",
            Self::PlayAllDivisions          => "play_all_divisions",
            Self::CloseSeason               => "close_season",
            Self::RegenerateFixtures { .. } => "regenerate_fixtures",
            Self::SeedCup { .. }            => "seed_cup",
            Self::PlayCupRound              => "play_cup_round",
            Self::PlayCupAll                => "play_cup_all",
            Self::HealAll                   => "heal_all",
            Self::SetConfig(_)              => "set_config",
            Self::SetTeamRating { .. }      => "set_team_rating",
            Self::AddTeam { .. }            => "add_team",
            Self::RemoveTeam { .. }         => "remove_team",
        }
    }
}
