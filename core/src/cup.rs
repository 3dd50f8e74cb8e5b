//! Single-elimination cup seeded from division standings.
//!
//! Ties are one-off matches at a neutral venue on the off-calendar round.
//! A drawn tie goes to `match_engine::decide_draw`; the score is kept as
//! played and the tie is flagged.

use crate::{
    config::{SimConfig, DEFAULT_CUP_INTAKE},
    division::{pick_pair, Division},
    error::{SimError, SimResult},
    match_engine::{self, MatchContext, MatchOutcome, Side, Venue, OFF_CALENDAR_ROUND},
    rng::SimRng,
    scorers::ScoringLeaderboard,
    snapshot::lenient,
    types::{Round, SeasonNo, TeamId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupTie {
    pub home: TeamId,
    pub away: TeamId,
    pub score: (u32, u32),
    pub winner: TeamId,
    /// True when the score was level and the tie-break decided it.
    #[serde(default)]
    pub tiebreak: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cup {
    #[serde(deserialize_with = "lenient::size")]
    pub per_division: usize,
    #[serde(deserialize_with = "lenient::vec")]
    pub alive: Vec<TeamId>,
    /// Completed rounds, first round first.
    pub rounds: Vec<Vec<CupTie>>,
    pub champion: Option<TeamId>,
    #[serde(deserialize_with = "lenient::count")]
    pub season_of: SeasonNo,
}

impl Default for Cup {
    fn default() -> Self {
        Self {
            per_division: DEFAULT_CUP_INTAKE,
            alive: Vec::new(),
            rounds: Vec::new(),
            champion: None,
            season_of: 0,
        }
    }
}

/// Largest power of two not above `n` (0 for 0).
pub fn largest_power_of_two_at_most(n: usize) -> usize {
    if n == 0 { 0 } else { 1 << (usize::BITS - 1 - n.leading_zeros()) }
}

impl Cup {
    pub fn is_finished(&self) -> bool {
        self.champion.is_some()
    }

    /// Nothing left to play: decided, or never seeded.
    pub fn is_idle(&self) -> bool {
        self.is_finished() || self.alive.len() < 2
    }

    /// Draw a new bracket from the top `per_division` of each ranking,
    /// cut down to a power of two and shuffled.
    pub fn seed(
        &mut self,
        rankings: &[Vec<TeamId>],
        per_division: usize,
        season: SeasonNo,
        rng: &mut SimRng,
    ) -> SimResult<usize> {
        let mut pool: Vec<TeamId> = rankings
            .iter()
            .flat_map(|ranked| ranked.iter().take(per_division).cloned())
            .collect();
        if pool.len() < 2 {
            return Err(SimError::NotEnoughCupTeams { found: pool.len() });
        }
        pool.truncate(largest_power_of_two_at_most(pool.len()));
        rng.shuffle(&mut pool);

        self.per_division = per_division;
        self.alive = pool;
        self.rounds.clear();
        self.champion = None;
        self.season_of = season;
        log::debug!("cup seeded for season {season} with {} teams", self.alive.len());
        Ok(self.alive.len())
    }

    /// Play every tie of the current round. Returns the ties in bracket
    /// order; an empty list means there was nothing to play.
    pub fn play_round(
        &mut self,
        divisions: &mut [Division],
        config: &SimConfig,
        season: SeasonNo,
        leaderboard: &mut ScoringLeaderboard,
        rng: &mut SimRng,
    ) -> Vec<CupTie> {
        if self.is_idle() {
            return Vec::new();
        }
        let ctx = MatchContext { config, round: OFF_CALENDAR_ROUND, venue: Venue::Neutral, season };
        let next_round: HashMap<TeamId, Round> = divisions
            .iter()
            .flat_map(|d| d.teams.iter().map(move |t| (t.id.clone(), d.round)))
            .collect();

        let mut ties = Vec::with_capacity(self.alive.len() / 2);
        let mut winners = Vec::with_capacity(self.alive.len() / 2 + 1);
        for pair in self.alive.chunks(2) {
            let [home_id, away_id] = pair else {
                winners.push(pair[0].clone()); // bye
                continue;
            };
            let Some((home, away)) = pick_pair(divisions.iter_mut().flat_map(|d| d.teams.iter_mut()), home_id, away_id)
            else {
                log::warn!("cup tie {home_id} v {away_id} names a missing team; home side advances");
                winners.push(home_id.clone());
                continue;
            };

            let outcome: MatchOutcome = match_engine::simulate(home, away, &ctx, leaderboard, rng);
            let (side, tiebreak) = match outcome.winner() {
                Some(side) => (side, false),
                None => (match_engine::decide_draw(home, away, rng), true),
            };
            for team in [home, away] {
                let resume = next_round.get(&team.id).copied().unwrap_or(0);
                match_engine::carry_absences(team, &outcome.detail, resume);
            }
            let winner = match side {
                Side::Home => home_id.clone(),
                Side::Away => away_id.clone(),
            };
            winners.push(winner.clone());
            ties.push(CupTie {
                home: home_id.clone(),
                away: away_id.clone(),
                score: outcome.score(),
                winner,
                tiebreak,
            });
        }

        self.alive = winners;
        self.rounds.push(ties.clone());

        if let [last] = self.alive.as_slice() {
            let champion = last.clone();
            if let Some(team) = divisions.iter_mut().flat_map(|d| d.teams.iter_mut()).find(|t| t.id == champion) {
                team.cup_titles += 1;
                log::info!("{} win the season {season} cup", team.name);
            }
            self.champion = Some(champion);
        }
        ties
    }

    /// Forget a team that left the league.
    pub fn withdraw(&mut self, team_id: &str) {
        self.alive.retain(|id| id != team_id);
    }
}
