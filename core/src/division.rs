use crate::{
    snapshot::lenient,
    standings::StandingsRow,
    team::Team,
    types::{DivisionCode, PlayerId, Round, TeamId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalEvent {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Yellow,
    Red,
    /// Third accumulated yellow.
    Suspension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEvent {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub kind: CardKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryEvent {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    /// Rounds missed after the one the injury happened in.
    pub rounds_out: Round,
}

/// Player-level detail of one played fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(default)]
    pub scorers: Vec<GoalEvent>,
    #[serde(default)]
    pub cards: Vec<CardEvent>,
    #[serde(default)]
    pub injuries: Vec<InjuryEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home: TeamId,
    pub away: TeamId,
    #[serde(default)]
    pub played: bool,
    #[serde(default)]
    pub score: Option<(u32, u32)>,
    #[serde(default)]
    pub detail: Option<MatchDetail>,
}

impl Fixture {
    pub fn new(home: TeamId, away: TeamId) -> Self {
        Self {
            home,
            away,
            played: false,
            score: None,
            detail: None,
        }
    }

    /// The final score, if the fixture has been played.
    pub fn result(&self) -> Option<(u32, u32)> {
        if self.played { self.score } else { None }
    }
}

/// Where a division is in its season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivisionPhase {
    Scheduling,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub code: DivisionCode,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub teams: Vec<Team>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub fixtures: Vec<Vec<Fixture>>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub round: Round,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub table: Vec<StandingsRow>,
}

impl Division {
    pub fn new(code: DivisionCode, name: String, teams: Vec<Team>) -> Self {
        Self {
            code,
            name,
            teams,
            fixtures: Vec::new(),
            round: 0,
            table: Vec::new(),
        }
    }

    pub fn total_rounds(&self) -> Round {
        self.fixtures.len() as Round
    }

    pub fn phase(&self) -> DivisionPhase {
        if self.fixtures.is_empty() {
            DivisionPhase::Scheduling
        } else if self.round < self.total_rounds() {
            DivisionPhase::InProgress
        } else {
            DivisionPhase::Complete
        }
    }

    /// Fewer than two teams can never produce a fixture.
    pub fn is_degenerate(&self) -> bool {
        self.teams.len() < 2
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.id.clone()).collect()
    }

    pub fn contains(&self, team_id: &str) -> bool {
        self.teams.iter().any(|t| t.id == team_id)
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn team_mut(&mut self, team_id: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == team_id)
    }

    /// Standings order when a table exists, roster order otherwise.
    pub fn ranked_team_ids(&self) -> Vec<TeamId> {
        if self.table.is_empty() {
            self.team_ids()
        } else {
            self.table.iter().map(|r| r.team_id.clone()).collect()
        }
    }

    pub fn fixture_count(&self) -> usize {
        self.fixtures.iter().map(Vec::len).sum()
    }

    pub fn played_count(&self) -> usize {
        self.fixtures.iter().flatten().filter(|f| f.played).count()
    }

    /// Drop schedule, results and table. The next round-advance reschedules.
    pub fn reset_schedule(&mut self) {
        self.fixtures.clear();
        self.round = 0;
        self.table.clear();
    }
}

/// Mutable access to two distinct teams out of any team iterator.
pub fn pick_pair<'a>(
    teams: impl Iterator<Item = &'a mut Team>,
    first: &str,
    second: &str,
) -> Option<(&'a mut Team, &'a mut Team)> {
    if first == second {
        return None;
    }
    let (mut a, mut b) = (None, None);
    for team in teams {
        if team.id == first {
            a = Some(team);
        } else if team.id == second {
            b = Some(team);
        }
    }
    Some((a?, b?))
}
