//! Per-season scoring leaderboard.

use crate::{
    team::Player,
    types::{PlayerId, SeasonNo, TeamId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerRow {
    pub team_id: TeamId,
    pub player_id: PlayerId,
    pub name: String,
    pub team_name: String,
    pub goals: u32,
}

/// Goal tallies keyed by season. A row is created on a player's first
/// goal of the season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringLeaderboard {
    seasons: BTreeMap<SeasonNo, Vec<ScorerRow>>,
}

impl ScoringLeaderboard {
    /// Start an empty table for `season` (existing rows are kept).
    pub fn open_season(&mut self, season: SeasonNo) {
        self.seasons.entry(season).or_default();
    }

    pub fn record_goal(&mut self, season: SeasonNo, team_id: &str, team_name: &str, player: &Player) {
        let rows = self.seasons.entry(season).or_default();
        match rows.iter_mut().find(|r| r.player_id == player.id) {
            Some(row) => row.goals += 1,
            None => rows.push(ScorerRow {
                team_id: team_id.to_string(),
                player_id: player.id.clone(),
                name: player.name.clone(),
                team_name: team_name.to_string(),
                goals: 1,
            }),
        }
    }

    pub fn season(&self, season: SeasonNo) -> &[ScorerRow] {
        self.seasons.get(&season).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_season(&self, season: SeasonNo) -> bool {
        self.seasons.contains_key(&season)
    }

    /// The `n` leading scorers of `season`, most goals first; ties keep the
    /// order in which players first scored.
    pub fn top(&self, season: SeasonNo, n: usize) -> Vec<ScorerRow> {
        let mut rows = self.season(season).to_vec();
        rows.sort_by(|a, b| b.goals.cmp(&a.goals));
        rows.truncate(n);
        rows
    }

    pub fn total_goals(&self, season: SeasonNo) -> u32 {
        self.season(season).iter().map(|r| r.goals).sum()
    }
}
