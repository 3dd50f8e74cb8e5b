//! League table computation.
//!
//! The table is derived state: it is rebuilt wholesale from the played
//! fixtures every time and never edited in place.

use crate::{division::Division, types::TeamId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub name: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
}

impl StandingsRow {
    fn empty(team_id: TeamId, name: String) -> Self {
        Self {
            team_id,
            name,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_diff: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_diff = self.goals_for as i32 - self.goals_against as i32;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Points desc, goal difference desc, goals for desc, team id asc.
pub fn rank_order(a: &StandingsRow, b: &StandingsRow) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.goal_diff.cmp(&a.goal_diff))
        .then_with(|| b.goals_for.cmp(&a.goals_for))
        .then_with(|| a.team_id.cmp(&b.team_id))
}

/// Fold every played fixture of `division` into a ranked table with one
/// row per member team.
pub fn compute_table(division: &Division) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = division
        .teams
        .iter()
        .map(|t| StandingsRow::empty(t.id.clone(), t.name.clone()))
        .collect();
    let index: HashMap<&str, usize> = division
        .teams
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.as_str(), i))
        .collect();

    for fixture in division.fixtures.iter().flatten() {
        let Some((home_goals, away_goals)) = fixture.result() else {
            continue;
        };
        let (Some(&h), Some(&a)) = (index.get(fixture.home.as_str()), index.get(fixture.away.as_str()))
        else {
            log::warn!(
                "division {}: skipping fixture {} v {} with a non-member team",
                division.code, fixture.home, fixture.away
            );
            continue;
        };
        rows[h].record(home_goals, away_goals);
        rows[a].record(away_goals, home_goals);
    }

    rows.sort_by(rank_order);
    rows
}

/// Recompute and store the division's table.
pub fn refresh(division: &mut Division) {
    division.table = compute_table(division);
}

pub fn total_points(rows: &[StandingsRow]) -> u32 {
    rows.iter().map(|r| r.points).sum()
}
