//! Season lifecycle: round advancement, playoffs, promotion/relegation
//! and the season-close reset.
//!
//! CLOSE ORDER (fixed, part of the per-seed behaviour):
//!   1. drain every division's remaining rounds, in division order
//!   2. champions (top-4 playoff when enabled), titles, summaries
//!   3. promotion plan from the final tables, then apply it
//!   4. reset schedules, multipliers and availability
//!   5. history, season counter, new multipliers
//!   6. reseed the cup from the final tables

use crate::{
    config::{SimConfig, PROMOTION_SLOTS},
    division::{pick_pair, CardKind, Division, MatchDetail},
    event::{Competition, SimEvent},
    fixture_scheduler::build_double_round_robin,
    match_engine::{self, MatchContext, Side, Venue, OFF_CALENDAR_ROUND},
    rng::SimRng,
    scorers::ScoringLeaderboard,
    snapshot::LeagueSnapshot,
    standings::{self, StandingsRow},
    team::Team,
    types::{DivisionCode, SeasonNo, TeamId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const PLAYOFF_TEAMS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub team_id: TeamId,
    pub team_name: String,
    pub from: DivisionCode,
    pub to: DivisionCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionSummary {
    pub code: DivisionCode,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub champion_id: Option<TeamId>,
    #[serde(default)]
    pub champion_name: String,
    #[serde(default)]
    pub decided_by_playoff: bool,
    #[serde(default)]
    pub table: Vec<StandingsRow>,
}

/// Immutable record of a closed season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub season: SeasonNo,
    #[serde(default)]
    pub divisions: Vec<DivisionSummary>,
    #[serde(default)]
    pub movements: Vec<Movement>,
}

// ── Rounds ─────────────────────────────────────────────────────────

/// Schedule the division if it has no fixtures yet.
pub fn ensure_schedule(division: &mut Division, season: SeasonNo) -> Option<SimEvent> {
    if !division.fixtures.is_empty() || division.is_degenerate() {
        return None;
    }
    division.fixtures = build_double_round_robin(&division.team_ids());
    division.round = 0;
    division.table.clear();
    log::debug!("division {}: scheduled {} rounds", division.code, division.total_rounds());
    Some(SimEvent::FixturesGenerated {
        season,
        division: division.code.clone(),
        rounds: division.total_rounds(),
        fixtures: division.fixture_count(),
    })
}

/// Play every unplayed fixture of the current round and advance the
/// counter. An empty result means there was nothing to play: the
/// division is complete or has fewer than two teams.
pub fn play_next_round(
    division: &mut Division,
    config: &SimConfig,
    season: SeasonNo,
    leaderboard: &mut ScoringLeaderboard,
    rng: &mut SimRng,
) -> Vec<SimEvent> {
    let mut events: Vec<SimEvent> = ensure_schedule(division, season).into_iter().collect();
    if division.is_degenerate() || division.round >= division.total_rounds() {
        return events;
    }

    let round = division.round;
    let ctx = MatchContext { config, round, venue: Venue::Home, season };
    let Division { code, teams, fixtures, .. } = &mut *division;
    for fixture in fixtures[round as usize].iter_mut().filter(|f| !f.played) {
        let Some((home, away)) = pick_pair(teams.iter_mut(), &fixture.home, &fixture.away) else {
            log::warn!("division {code}: fixture {} v {} skipped, team missing", fixture.home, fixture.away);
            continue;
        };
        let outcome = match_engine::simulate(home, away, &ctx, leaderboard, rng);
        events.push(SimEvent::MatchPlayed {
            season,
            competition: Competition::League,
            division: Some(code.clone()),
            round,
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            home_goals: outcome.home_goals,
            away_goals: outcome.away_goals,
        });
        events.extend(availability_events(season, &outcome.detail));
        fixture.played = true;
        fixture.score = Some(outcome.score());
        fixture.detail = Some(outcome.detail);
    }

    division.round += 1;
    standings::refresh(division);
    events.push(SimEvent::RoundPlayed {
        season,
        division: division.code.clone(),
        round: division.round,
        total_rounds: division.total_rounds(),
    });
    events
}

/// Play rounds until the division is complete.
pub fn play_all_rounds(
    division: &mut Division,
    config: &SimConfig,
    season: SeasonNo,
    leaderboard: &mut ScoringLeaderboard,
    rng: &mut SimRng,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    loop {
        let played = play_next_round(division, config, season, leaderboard, rng);
        let advanced = played.iter().any(|e| matches!(e, SimEvent::RoundPlayed { .. }));
        events.extend(played);
        if !advanced {
            return events;
        }
    }
}

fn availability_events(season: SeasonNo, detail: &MatchDetail) -> Vec<SimEvent> {
    let injuries = detail.injuries.iter().map(|i| SimEvent::PlayerInjured {
        season,
        team_id: i.team_id.clone(),
        player_id: i.player_id.clone(),
        rounds_out: i.rounds_out,
    });
    let bans = detail
        .cards
        .iter()
        .filter(|c| c.kind != CardKind::Yellow)
        .map(|c| SimEvent::PlayerSuspended {
            season,
            team_id: c.team_id.clone(),
            player_id: c.player_id.clone(),
            card: c.kind,
        });
    injuries.chain(bans).collect()
}

// ── Playoffs ───────────────────────────────────────────────────────

/// Top-4 knockout: 1v4 and 2v3, winners meet in the final. None when the
/// table has fewer than four rows.
pub fn run_playoff(
    division: &mut Division,
    config: &SimConfig,
    season: SeasonNo,
    leaderboard: &mut ScoringLeaderboard,
    rng: &mut SimRng,
    events: &mut Vec<SimEvent>,
) -> Option<TeamId> {
    let seeds: Vec<TeamId> =
        division.table.iter().take(PLAYOFF_TEAMS).map(|r| r.team_id.clone()).collect();
    if seeds.len() < PLAYOFF_TEAMS {
        return None;
    }
    let ctx = MatchContext { config, round: OFF_CALENDAR_ROUND, venue: Venue::Neutral, season };
    let code = division.code.clone();
    let teams = &mut division.teams;

    let first = knockout(teams, &seeds[0], &seeds[3], &ctx, &code, leaderboard, rng, events)?;
    let second = knockout(teams, &seeds[1], &seeds[2], &ctx, &code, leaderboard, rng, events)?;
    let champion = knockout(teams, &first, &second, &ctx, &code, leaderboard, rng, events)?;

    events.push(SimEvent::PlayoffDecided { season, division: code, champion_id: champion.clone() });
    Some(champion)
}

#[allow(clippy::too_many_arguments)]
fn knockout(
    teams: &mut [Team],
    home_id: &str,
    away_id: &str,
    ctx: &MatchContext<'_>,
    code: &str,
    leaderboard: &mut ScoringLeaderboard,
    rng: &mut SimRng,
    events: &mut Vec<SimEvent>,
) -> Option<TeamId> {
    let (home, away) = pick_pair(teams.iter_mut(), home_id, away_id)?;
    let outcome = match_engine::simulate(home, away, ctx, leaderboard, rng);
    let side = outcome.winner().unwrap_or_else(|| match_engine::decide_draw(home, away, rng));
    // Absences run into the rest of the playoff and are healed at close.
    for team in [home, away] {
        match_engine::carry_absences(team, &outcome.detail, ctx.round);
    }
    events.push(SimEvent::MatchPlayed {
        season: ctx.season,
        competition: Competition::Playoff,
        division: Some(code.to_string()),
        round: ctx.round,
        home: home_id.to_string(),
        away: away_id.to_string(),
        home_goals: outcome.home_goals,
        away_goals: outcome.away_goals,
    });
    Some(match side {
        Side::Home => home_id.to_string(),
        Side::Away => away_id.to_string(),
    })
}

// ── Promotion / relegation ─────────────────────────────────────────

/// Teams crossing one boundary between adjacent divisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub upper: usize,
    pub lower: usize,
    /// Bottom of the upper table, in table order.
    pub relegated: Vec<TeamId>,
    /// Top of the lower table, in table order.
    pub promoted: Vec<TeamId>,
}

/// Every boundary's moves, computed from the tables before any swap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionPlan {
    pub boundaries: Vec<Boundary>,
}

/// Slots per boundary: PROMOTION_SLOTS, or fewer when a division is too
/// small to give up that many without emptying.
pub fn promotion_slots(upper_len: usize, lower_len: usize) -> usize {
    PROMOTION_SLOTS.min(upper_len.min(lower_len) / 2)
}

impl PromotionPlan {
    pub fn compute(divisions: &[Division]) -> Self {
        let boundaries = (1..divisions.len())
            .filter_map(|lower| {
                let upper = lower - 1;
                let upper_ranked = divisions[upper].ranked_team_ids();
                let lower_ranked = divisions[lower].ranked_team_ids();
                let slots = promotion_slots(upper_ranked.len(), lower_ranked.len());
                if slots == 0 {
                    return None;
                }
                Some(Boundary {
                    upper,
                    lower,
                    relegated: upper_ranked[upper_ranked.len() - slots..].to_vec(),
                    promoted: lower_ranked[..slots].to_vec(),
                })
            })
            .collect();
        Self { boundaries }
    }

    /// Pull every moving team out first, then place them. A middle
    /// division ends up as: kept teams, arrivals from above, arrivals
    /// from below.
    pub fn apply(&self, divisions: &mut [Division]) -> Vec<Movement> {
        let mut leaving: HashMap<TeamId, Team> = HashMap::new();
        for boundary in &self.boundaries {
            for (idx, ids) in [(boundary.upper, &boundary.relegated), (boundary.lower, &boundary.promoted)] {
                let division = &mut divisions[idx];
                let (moving, kept): (Vec<Team>, Vec<Team>) =
                    division.teams.drain(..).partition(|t| ids.contains(&t.id));
                division.teams = kept;
                leaving.extend(moving.into_iter().map(|t| (t.id.clone(), t)));
            }
        }

        let mut movements = Vec::new();
        for boundary in &self.boundaries {
            let moves = [
                (&boundary.promoted, boundary.lower, boundary.upper),
                (&boundary.relegated, boundary.upper, boundary.lower),
            ];
            for (ids, from, to) in moves {
                for id in ids {
                    let Some(team) = leaving.remove(id) else { continue };
                    movements.push(Movement {
                        team_id: team.id.clone(),
                        team_name: team.name.clone(),
                        from: divisions[from].code.clone(),
                        to: divisions[to].code.clone(),
                    });
                    divisions[to].teams.push(team);
                }
            }
        }
        movements
    }
}

// ── Season boundaries ──────────────────────────────────────────────

/// Open the current season: scorer table and any missing multipliers.
pub fn open_season(state: &mut LeagueSnapshot, rng: &mut SimRng) {
    state.scorers.open_season(state.season);
    let sigma = state.config.season_sigma;
    for team in state.divisions.iter_mut().flat_map(|d| d.teams.iter_mut()) {
        team.open_season(rng, sigma);
    }
}

/// Finish the current season and open the next one.
pub fn close_season(state: &mut LeagueSnapshot, rng: &mut SimRng) -> Vec<SimEvent> {
    let season = state.season;
    let config = state.config.clone();
    let mut events = Vec::new();

    for division in &mut state.divisions {
        events.extend(play_all_rounds(division, &config, season, &mut state.scorers, rng));
        standings::refresh(division);
    }

    let mut summaries = Vec::with_capacity(state.divisions.len());
    let mut champions = BTreeMap::new();
    for division in &mut state.divisions {
        let playoff_winner = if config.playoffs {
            run_playoff(division, &config, season, &mut state.scorers, rng, &mut events)
        } else {
            None
        };
        let decided_by_playoff = playoff_winner.is_some();
        let champion_id = playoff_winner.or_else(|| division.table.first().map(|r| r.team_id.clone()));

        let code = division.code.clone();
        let mut champion_name = String::new();
        if let Some(team) = champion_id.as_deref().and_then(|id| division.team_mut(id)) {
            team.record_title(&code);
            champion_name = team.name.clone();
            champions.insert(code.clone(), team.id.clone());
            log::info!("season {season}: {} champions of division {code}", team.name);
        }
        summaries.push(DivisionSummary {
            code,
            name: division.name.clone(),
            champion_id,
            champion_name,
            decided_by_playoff,
            table: division.table.clone(),
        });
    }

    let final_rankings: Vec<Vec<TeamId>> =
        state.divisions.iter().map(Division::ranked_team_ids).collect();

    let plan = PromotionPlan::compute(&state.divisions);
    let movements = plan.apply(&mut state.divisions);
    events.extend(movements.iter().map(|m| SimEvent::TeamMoved {
        season,
        team_id: m.team_id.clone(),
        from: m.from.clone(),
        to: m.to.clone(),
    }));

    for division in &mut state.divisions {
        division.reset_schedule();
        for team in &mut division.teams {
            team.close_season();
        }
    }

    state.history.push(SeasonSummary { season, divisions: summaries, movements });
    events.push(SimEvent::SeasonClosed { season, champions });

    state.season += 1;
    open_season(state, rng);

    let per_division = state.cup.per_division;
    match state.cup.seed(&final_rankings, per_division, state.season, rng) {
        Ok(teams) => events.push(SimEvent::CupSeeded { season: state.season, teams }),
        Err(e) => log::warn!("cup not reseeded for season {}: {e}", state.season),
    }

    events
}
