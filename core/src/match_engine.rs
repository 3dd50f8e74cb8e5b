//! Match resolution: team strengths → expected goals → Poisson score,
//! then scorers, cards and injuries for the two starting elevens.
//!
//! DRAW ORDER (fixed, part of the per-seed behaviour):
//!   1. performance noise home, away
//!   2. total goals
//!   3. score home, away
//!   4. squads (first use only), elevens home, away
//!   5. scorers home, away
//!   6. discipline + injuries home, away
//!
//! No error paths: every random quantity is clamped before use.

use crate::{
    config::SimConfig,
    division::{CardEvent, CardKind, GoalEvent, InjuryEvent, MatchDetail},
    rng::{CumulativeWeights, SimRng},
    roster,
    scorers::ScoringLeaderboard,
    team::Team,
    types::{Round, SeasonNo},
};

pub const MIN_TOTAL_GOALS: f64 = 0.6;
pub const TOTAL_GOALS_SIGMA: f64 = 0.25;
pub const MIN_EXPECTED_GOALS: f64 = 0.2;
pub const MAX_EXPECTED_GOALS: f64 = 5.0;

/// Floor of the team rating used to normalise scorer weights.
pub const SCORER_RATING_FLOOR: f64 = 50.0;

pub const YELLOW_CARDS_MEAN: f64 = 1.6;
pub const RED_CARD_CHANCE: f64 = 0.12;
pub const YELLOWS_PER_SUSPENSION: u32 = 3;
/// Rounds a suspended player sits out.
pub const SUSPENSION_ROUNDS: Round = 1;

pub const MINOR_INJURY_CHANCE: f64 = 0.02;
/// Cumulative threshold: (MINOR, MAJOR] is a major injury.
pub const MAJOR_INJURY_THRESHOLD: f64 = 0.026;
pub const MINOR_INJURY_ROUNDS: (u32, u32) = (1, 2);
pub const MAJOR_INJURY_ROUNDS: (u32, u32) = (3, 6);

/// Noise added to season strength when a knockout draw must be decided.
pub const TIEBREAK_SIGMA: f64 = 0.2;

/// Round index for playoff and cup matches. Anyone whose absence ends
/// inside a normal season is available. Absences picked up here are only
/// recorded in the match detail; `carry_absences` charges them against the
/// team's next league round.
pub const OFF_CALENDAR_ROUND: Round = 9_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    /// The first team named plays at home.
    Home,
    /// Playoffs and cup ties: no home edge.
    Neutral,
}

impl Venue {
    pub fn edge(&self, config: &SimConfig) -> f64 {
        match self {
            Self::Home    => config.home_edge,
            Self::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

/// Everything about the occasion that is not a team.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub config: &'a SimConfig,
    pub round: Round,
    pub venue: Venue,
    pub season: SeasonNo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub home_goals: u32,
    pub away_goals: u32,
    pub detail: MatchDetail,
}

impl MatchOutcome {
    pub fn score(&self) -> (u32, u32) {
        (self.home_goals, self.away_goals)
    }

    pub fn winner(&self) -> Option<Side> {
        match self.home_goals.cmp(&self.away_goals) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less    => Some(Side::Away),
            std::cmp::Ordering::Equal   => None,
        }
    }
}

/// Split the expected total between the sides.
///
/// home share = sH·(0.5+edge) / (sH·(0.5+edge) + sA·(0.5−edge)); each
/// side's expectation is clamped to [MIN_EXPECTED_GOALS, MAX_EXPECTED_GOALS].
pub fn expected_goals(home_strength: f64, away_strength: f64, total: f64, edge: f64) -> (f64, f64) {
    let home_weight = (home_strength * (0.5 + edge)).max(0.0);
    let away_weight = (away_strength * (0.5 - edge)).max(0.0);
    let denom = home_weight + away_weight;
    let share = if denom > 0.0 && denom.is_finite() { home_weight / denom } else { 0.5 };
    (
        (total * share).clamp(MIN_EXPECTED_GOALS, MAX_EXPECTED_GOALS),
        (total * (1.0 - share)).clamp(MIN_EXPECTED_GOALS, MAX_EXPECTED_GOALS),
    )
}

/// Play one match. Mutates both squads (goals, cards, injuries,
/// appearances) and the season leaderboard.
pub fn simulate(
    home: &mut Team,
    away: &mut Team,
    ctx: &MatchContext<'_>,
    leaderboard: &mut ScoringLeaderboard,
    rng: &mut SimRng,
) -> MatchOutcome {
    let config = ctx.config;
    let home_strength = home.strength() * (1.0 + rng.normal(0.0, config.perf_sigma)).max(0.0);
    let away_strength = away.strength() * (1.0 + rng.normal(0.0, config.perf_sigma)).max(0.0);

    let total = (config.avg_goals + rng.normal(0.0, TOTAL_GOALS_SIGMA)).max(MIN_TOTAL_GOALS);
    let (home_xg, away_xg) =
        expected_goals(home_strength, away_strength, total, ctx.venue.edge(config));
    let home_goals = rng.poisson(home_xg);
    let away_goals = rng.poisson(away_xg);

    roster::ensure_roster(home, rng);
    roster::ensure_roster(away, rng);
    let home_eleven = roster::select_starting_eleven(home, ctx.round, rng);
    let away_eleven = roster::select_starting_eleven(away, ctx.round, rng);

    let mut detail = MatchDetail::default();
    allocate_goals(home, &home_eleven, home_goals, ctx.season, leaderboard, &mut detail, rng);
    allocate_goals(away, &away_eleven, away_goals, ctx.season, leaderboard, &mut detail, rng);
    discipline_and_injuries(home, &home_eleven, ctx.round, &mut detail, rng);
    discipline_and_injuries(away, &away_eleven, ctx.round, &mut detail, rng);

    log::debug!(
        "{} {home_goals}-{away_goals} {} (xg {home_xg:.2}/{away_xg:.2}, round {})",
        home.name, away.name, ctx.round
    );

    MatchOutcome { home_goals, away_goals, detail }
}

/// Settle a drawn knockout tie: season strength plus independent
/// N(0, TIEBREAK_SIGMA) noise per side, higher total advances.
pub fn decide_draw(home: &Team, away: &Team, rng: &mut SimRng) -> Side {
    let home_bump = home.strength() + rng.normal(0.0, TIEBREAK_SIGMA);
    let away_bump = away.strength() + rng.normal(0.0, TIEBREAK_SIGMA);
    if home_bump > away_bump { Side::Home } else { Side::Away }
}

/// Apply the bans and injuries `team` picked up in an off-calendar match,
/// counting from `next_round`, the first league round it has still to play.
pub fn carry_absences(team: &mut Team, detail: &MatchDetail, next_round: Round) {
    for card in detail.cards.iter().filter(|c| c.team_id == team.id && c.kind != CardKind::Yellow) {
        if let Some(player) = team.players.iter_mut().find(|p| p.id == card.player_id) {
            player.suspended_until = player.suspended_until.max(next_round.saturating_add(SUSPENSION_ROUNDS));
        }
    }
    for injury in detail.injuries.iter().filter(|i| i.team_id == team.id) {
        if let Some(player) = team.players.iter_mut().find(|p| p.id == injury.player_id) {
            player.injured_until = player.injured_until.max(next_round.saturating_add(injury.rounds_out));
        }
    }
}

fn allocate_goals(
    team: &mut Team,
    eleven: &[usize],
    goals: u32,
    season: SeasonNo,
    leaderboard: &mut ScoringLeaderboard,
    detail: &mut MatchDetail,
    rng: &mut SimRng,
) {
    if goals == 0 || eleven.is_empty() {
        return;
    }
    let norm = team.rating.max(SCORER_RATING_FLOOR);
    let weights = CumulativeWeights::new(eleven.iter().map(|&i| {
        let p = &team.players[i];
        p.position.scoring_weight() * (p.overall / norm)
    }));

    for _ in 0..goals {
        let Some(slot) = weights.pick(rng) else { break };
        let player = &mut team.players[eleven[slot]];
        player.goals += 1;
        detail.scorers.push(GoalEvent {
            team_id: team.id.clone(),
            player_id: player.id.clone(),
            name: player.name.clone(),
        });
        leaderboard.record_goal(season, &team.id, &team.name, player);
    }
}

fn discipline_and_injuries(
    team: &mut Team,
    eleven: &[usize],
    round: Round,
    detail: &mut MatchDetail,
    rng: &mut SimRng,
) {
    if eleven.is_empty() {
        return;
    }
    let on_calendar = round != OFF_CALENDAR_ROUND;
    let back_after_ban = round.saturating_add(SUSPENSION_ROUNDS + 1);

    let yellows = rng.poisson(YELLOW_CARDS_MEAN);
    for _ in 0..yellows {
        let player = &mut team.players[eleven[rng.pick_index(eleven.len())]];
        player.yellow_cards += 1;
        detail.cards.push(card(&team.id, &player.id, CardKind::Yellow));
        if player.yellow_cards % YELLOWS_PER_SUSPENSION == 0 {
            if on_calendar {
                player.suspended_until = player.suspended_until.max(back_after_ban);
            }
            detail.cards.push(card(&team.id, &player.id, CardKind::Suspension));
        }
    }

    if rng.chance(RED_CARD_CHANCE) {
        let player = &mut team.players[eleven[rng.pick_index(eleven.len())]];
        player.red_cards += 1;
        if on_calendar {
            player.suspended_until = player.suspended_until.max(back_after_ban);
        }
        detail.cards.push(card(&team.id, &player.id, CardKind::Red));
    }

    for &i in eleven {
        let player = &mut team.players[i];
        let roll = rng.next_f64();
        let rounds_out = if roll < MINOR_INJURY_CHANCE {
            Some(rng.range_inclusive(MINOR_INJURY_ROUNDS.0, MINOR_INJURY_ROUNDS.1))
        } else if roll < MAJOR_INJURY_THRESHOLD {
            Some(rng.range_inclusive(MAJOR_INJURY_ROUNDS.0, MAJOR_INJURY_ROUNDS.1))
        } else {
            None
        };
        if let Some(out) = rounds_out {
            if on_calendar {
                player.injured_until = player.injured_until.max(round.saturating_add(out + 1));
            }
            detail.injuries.push(InjuryEvent {
                team_id: team.id.clone(),
                player_id: player.id.clone(),
                rounds_out: out,
            });
        }
        player.appearances += 1;
    }
}

fn card(team_id: &str, player_id: &str, kind: CardKind) -> CardEvent {
    CardEvent {
        team_id: team_id.to_string(),
        player_id: player_id.to_string(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strength_neutral_split_is_even() {
        let (h, a) = expected_goals(80.0, 80.0, 2.7, 0.0);
        assert!((h - a).abs() < 1e-12);
        assert!((h - 1.35).abs() < 1e-12);
    }

    #[test]
    fn home_edge_favours_home_side() {
        let (h, a) = expected_goals(80.0, 80.0, 2.7, 0.12);
        assert!(h > a, "home {h} should exceed away {a}");
        assert!((h + a - 2.7).abs() < 1e-9);
    }

    #[test]
    fn expectations_are_clamped() {
        let (h, a) = expected_goals(99.0, 1.0, 20.0, 0.0);
        assert_eq!(h, MAX_EXPECTED_GOALS);
        assert_eq!(a, MIN_EXPECTED_GOALS);
    }

    #[test]
    fn degenerate_strengths_split_evenly() {
        let (h, a) = expected_goals(0.0, 0.0, 2.0, 0.0);
        assert_eq!(h, a);
    }
}
