//! Everything a command did, as data.
//!
//! The engine returns these from every command; the runner persists them.
//! The engine itself never writes them anywhere.

use crate::{
    division::CardKind,
    types::{DivisionCode, PlayerId, Round, RunId, SeasonNo, TeamId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Competition {
    League,
    Playoff,
    Cup,
}

/// Every event emitted by the engine.
/// Variants may be added; existing ones keep their shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    CommandReceived {
        season: SeasonNo,
        command_type: String,
    },
    SnapshotImported {
        season: SeasonNo,
        divisions: usize,
        teams: usize,
    },
    SnapshotRepaired {
        notes: Vec<String>,
    },

    // ── League events ──────────────────────────────
    FixturesGenerated {
        season: SeasonNo,
        division: DivisionCode,
        rounds: Round,
        fixtures: usize,
    },
    MatchPlayed {
        season: SeasonNo,
        competition: Competition,
        division: Option<DivisionCode>,
        round: Round,
        home: TeamId,
        away: TeamId,
        home_goals: u32,
        away_goals: u32,
    },
    RoundPlayed {
        season: SeasonNo,
        division: DivisionCode,
        round: Round,
        total_rounds: Round,
    },
    PlayerInjured {
        season: SeasonNo,
        team_id: TeamId,
        player_id: PlayerId,
        rounds_out: Round,
    },
    PlayerSuspended {
        season: SeasonNo,
        team_id: TeamId,
        player_id: PlayerId,
        card: CardKind,
    },
    PlayoffDecided {
        season: SeasonNo,
        division: DivisionCode,
        champion_id: TeamId,
    },
    TeamMoved {
        season: SeasonNo,
        team_id: TeamId,
        from: DivisionCode,
        to: DivisionCode,
    },
    SeasonClosed {
        season: SeasonNo,
        /// Division code → champion id.
        champions: BTreeMap<DivisionCode, TeamId>,
    },

    // ── Cup events ─────────────────────────────────
    CupSeeded {
        season: SeasonNo,
        teams: usize,
    },
    CupRoundPlayed {
        season: SeasonNo,
        round: u32,
        ties: usize,
        remaining: usize,
    },
    CupWon {
        season: SeasonNo,
        team_id: TeamId,
    },
}

/// Persistent log entry, as stored by `SimStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub season:     SeasonNo,
    pub source:     String,
    pub event_type: String,
    pub payload:    String, // JSON
}

impl EventLogEntry {
    pub fn from_event(run_id: &str, season: SeasonNo, event: &SimEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id:         None,
            run_id:     run_id.to_string(),
            season,
            source:     event_source(event).to_string(),
            event_type: event_type_name(event).to_string(),
            payload:    serde_json::to_string(event)?,
        })
    }
}

pub fn event_type_name(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::CommandReceived { .. }  => "command_received",
        SimEvent::SnapshotImported { .. } => "snapshot_imported",
        SimEvent::SnapshotRepaired { .. } => "snapshot_repaired",
        SimEvent::FixturesGenerated { .. } => "fixtures_generated",
        SimEvent::MatchPlayed { .. }      => "match_played",
        SimEvent::RoundPlayed { .. }      => "round_played",
        SimEvent::PlayerInjured { .. }    => "player_injured",
        SimEvent::PlayerSuspended { .. }  => "player_suspended",
        SimEvent::PlayoffDecided { .. }   => "playoff_decided",
        SimEvent::TeamMoved { .. }        => "team_moved",
        SimEvent::SeasonClosed { .. }     => "season_closed",
        SimEvent::CupSeeded { .. }        => "cup_seeded",
        SimEvent::CupRoundPlayed { .. }   => "cup_round_played",
        SimEvent::CupWon { .. }           => "cup_won",
    }
}

/// Which part of the engine produced the event.
pub fn event_source(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::CommandReceived { .. }
        | SimEvent::SnapshotImported { .. }
        | SimEvent::SnapshotRepaired { .. } => "engine",
        SimEvent::CupSeeded { .. }
        | SimEvent::CupRoundPlayed { .. }
        | SimEvent::CupWon { .. } => "cup",
        SimEvent::MatchPlayed { competition: Competition::Cup, .. } => "cup",
        _ => "league",
    }
}
