//! The league engine: owns the state and the random stream, applies
//! commands, returns the events they produced.
//!
//! RULES:
//!   - Every command runs to completion before control returns.
//!   - All randomness flows through the one `SimRng`, in command order.
//!   - The engine performs no I/O; callers persist what they need.
//!   - A rejected command leaves the state untouched.

use crate::{
    command::LeagueCommand,
    config::{ConfigPatch, LeagueSetup, EDITABLE_RATING_MAX, EDITABLE_RATING_MIN},
    cup::Cup,
    division::Division,
    error::{SimError, SimResult},
    event::{Competition, SimEvent},
    match_engine::OFF_CALENDAR_ROUND,
    rng::SimRng,
    scorers::ScorerRow,
    season,
    snapshot::LeagueSnapshot,
    team::Team,
    types::{SeasonNo, TeamId},
};

pub struct LeagueEngine {
    state: LeagueSnapshot,
    rng:   SimRng,
    seed:  u64,
}

impl LeagueEngine {
    /// Wrap an existing (already valid) state and open its season.
    pub fn new(state: LeagueSnapshot, seed: u64) -> Self {
        let mut engine = Self { state, rng: SimRng::new(seed), seed };
        season::open_season(&mut engine.state, &mut engine.rng);
        engine
    }

    /// Generate a fresh league from `setup`.
    pub fn build(setup: &LeagueSetup, seed: u64) -> Self {
        let mut rng = SimRng::new(seed);
        let mut state = LeagueSnapshot::from_setup(setup, &mut rng);
        season::open_season(&mut state, &mut rng);
        Self { state, rng, seed }
    }

    /// The small two-division league used by tests.
    pub fn build_test(seed: u64) -> Self {
        Self::build(&LeagueSetup::default_test(), seed)
    }

    /// Build an engine from snapshot JSON, repairing it on the way in.
    pub fn from_json(json: &str, seed: u64) -> SimResult<(Self, Vec<SimEvent>)> {
        let mut engine = Self {
            state: LeagueSnapshot::default(),
            rng:   SimRng::new(seed),
            seed,
        };
        let events = engine.import_json(json)?;
        Ok((engine, events))
    }

    /// Replace the state with an imported snapshot. Malformed JSON is
    /// rejected and the current state kept.
    pub fn import_json(&mut self, json: &str) -> SimResult<Vec<SimEvent>> {
        let mut incoming = LeagueSnapshot::from_json(json)?;
        let report = incoming.repair();
        self.state = incoming;
        season::open_season(&mut self.state, &mut self.rng);

        let mut events = Vec::new();
        if !report.is_clean() {
            events.push(SimEvent::SnapshotRepaired { notes: report.notes });
        }
        events.push(SimEvent::SnapshotImported {
            season:    self.state.season,
            divisions: self.state.divisions.len(),
            teams:     self.state.team_count(),
        });
        log::info!(
            "imported season {} with {} teams",
            self.state.season,
            self.state.team_count()
        );
        Ok(events)
    }

    // ── Read access ────────────────────────────────────────────

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn season(&self) -> SeasonNo {
        self.state.season
    }

    pub fn snapshot(&self) -> &LeagueSnapshot {
        &self.state
    }

    pub fn division(&self, code: &str) -> Option<&Division> {
        self.state.divisions.iter().find(|d| d.code == code)
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.state.divisions.iter().find_map(|d| d.team(team_id))
    }

    pub fn cup(&self) -> &Cup {
        &self.state.cup
    }

    /// The cup opens once a season has been closed.
    pub fn cup_unlocked(&self) -> bool {
        !self.state.history.is_empty()
    }

    pub fn top_scorers(&self, season: SeasonNo, n: usize) -> Vec<ScorerRow> {
        self.state.scorers.top(season, n)
    }

    pub fn to_json(&self) -> SimResult<String> {
        self.state.to_json()
    }

    // ── Commands ───────────────────────────────────────────────

    /// Apply one command. The first event is always `CommandReceived`.
    pub fn apply(&mut self, command: &LeagueCommand) -> SimResult<Vec<SimEvent>> {
        log::debug!("season {}: applying {}", self.state.season, command.name());
        let mut events = vec![SimEvent::CommandReceived {
            season:       self.state.season,
            command_type: command.name().to_string(),
        }];

        let result = match command {
            LeagueCommand::PlayNextRound { division }      => self.play_next_round(division),
            LeagueCommand::PlayAllRounds { division }      => self.play_all_rounds(division),
            LeagueCommand::PlayNextRoundAll                => Ok(self.play_next_round_all()),
            LeagueCommand::PlayAllDivisions                => Ok(self.play_all_divisions()),
            LeagueCommand::CloseSeason                     => Ok(self.close_season()),
            LeagueCommand::RegenerateFixtures { division } => self.regenerate_fixtures(division),
            LeagueCommand::SeedCup { per_division }        => self.seed_cup(*per_division),
            LeagueCommand::PlayCupRound                    => self.play_cup_round(),
            LeagueCommand::PlayCupAll                      => self.play_cup_all(),
            LeagueCommand::HealAll                         => {
                self.heal_all();
                Ok(Vec::new())
            }
            LeagueCommand::SetConfig(patch)                => {
                self.set_config(patch);
                Ok(Vec::new())
            }
            LeagueCommand::SetTeamRating { team_id, rating } => {
                self.set_team_rating(team_id, *rating).map(|_| Vec::new())
            }
            LeagueCommand::AddTeam { division, name, rating } => {
                self.add_team(division, name, *rating).map(|_| Vec::new())
            }
            LeagueCommand::RemoveTeam { team_id } => self.remove_team(team_id).map(|_| Vec::new()),
        };

        match result {
            Ok(produced) => {
                events.extend(produced);
                Ok(events)
            }
            Err(e) => {
                log::warn!("{} rejected: {e}", command.name());
                Err(e)
            }
        }
    }

    /// One round of one division. Empty when there was nothing to play.
    pub fn play_next_round(&mut self, code: &str) -> SimResult<Vec<SimEvent>> {
        let Self { state, rng, .. } = self;
        let division = find_division(&mut state.divisions, code)?;
        Ok(season::play_next_round(division, &state.config, state.season, &mut state.scorers, rng))
    }

    pub fn play_all_rounds(&mut self, code: &str) -> SimResult<Vec<SimEvent>> {
        let Self { state, rng, .. } = self;
        let division = find_division(&mut state.divisions, code)?;
        Ok(season::play_all_rounds(division, &state.config, state.season, &mut state.scorers, rng))
    }

    /// One round in every division, in division order.
    pub fn play_next_round_all(&mut self) -> Vec<SimEvent> {
        let Self { state, rng, .. } = self;
        let mut events = Vec::new();
        for division in &mut state.divisions {
            events.extend(season::play_next_round(division, &state.config, state.season, &mut state.scorers, rng));
        }
        events
    }

    pub fn play_all_divisions(&mut self) -> Vec<SimEvent> {
        let Self { state, rng, .. } = self;
        let mut events = Vec::new();
        for division in &mut state.divisions {
            events.extend(season::play_all_rounds(division, &state.config, state.season, &mut state.scorers, rng));
        }
        events
    }

    pub fn close_season(&mut self) -> Vec<SimEvent> {
        season::close_season(&mut self.state, &mut self.rng)
    }

    /// Throw away a division's schedule and results and draw a new one.
    pub fn regenerate_fixtures(&mut self, code: &str) -> SimResult<Vec<SimEvent>> {
        let season = self.state.season;
        let division = find_division(&mut self.state.divisions, code)?;
        division.reset_schedule();
        Ok(season::ensure_schedule(division, season).into_iter().collect())
    }

    // ── Cup ────────────────────────────────────────────────────

    pub fn seed_cup(&mut self, per_division: usize) -> SimResult<Vec<SimEvent>> {
        self.require_cup_unlocked()?;
        let rankings: Vec<Vec<TeamId>> =
            self.state.divisions.iter().map(Division::ranked_team_ids).collect();
        let teams = self.state.cup.seed(&rankings, per_division, self.state.season, &mut self.rng)?;
        Ok(vec![SimEvent::CupSeeded { season: self.state.season, teams }])
    }

    /// Play the current cup round. Empty when the cup is decided.
    pub fn play_cup_round(&mut self) -> SimResult<Vec<SimEvent>> {
        self.require_cup_unlocked()?;
        let Self { state, rng, .. } = self;
        if state.cup.is_idle() {
            return Ok(Vec::new());
        }
        let season = state.season;
        let ties = state.cup.play_round(&mut state.divisions, &state.config, season, &mut state.scorers, rng);

        let mut events: Vec<SimEvent> = ties
            .iter()
            .map(|tie| SimEvent::MatchPlayed {
                season,
                competition: Competition::Cup,
                division:    None,
                round:       OFF_CALENDAR_ROUND,
                home:        tie.home.clone(),
                away:        tie.away.clone(),
                home_goals:  tie.score.0,
                away_goals:  tie.score.1,
            })
            .collect();
        events.push(SimEvent::CupRoundPlayed {
            season,
            round:     state.cup.rounds.len() as u32,
            ties:      ties.len(),
            remaining: state.cup.alive.len(),
        });
        if let Some(champion) = &state.cup.champion {
            events.push(SimEvent::CupWon { season, team_id: champion.clone() });
        }
        Ok(events)
    }

    pub fn play_cup_all(&mut self) -> SimResult<Vec<SimEvent>> {
        self.require_cup_unlocked()?;
        let mut events = Vec::new();
        while !self.state.cup.is_idle() {
            events.extend(self.play_cup_round()?);
        }
        Ok(events)
    }

    fn require_cup_unlocked(&self) -> SimResult<()> {
        if self.cup_unlocked() { Ok(()) } else { Err(SimError::CupLocked) }
    }

    // ── Administration ─────────────────────────────────────────

    pub fn heal_all(&mut self) {
        for team in self.state.divisions.iter_mut().flat_map(|d| d.teams.iter_mut()) {
            team.heal();
        }
    }

    pub fn set_config(&mut self, patch: &ConfigPatch) {
        self.state.config = patch.apply_to(&self.state.config);
    }

    pub fn set_team_rating(&mut self, team_id: &str, rating: f64) -> SimResult<()> {
        validate_rating(rating)?;
        let team = self
            .state
            .divisions
            .iter_mut()
            .find_map(|d| d.team_mut(team_id))
            .ok_or_else(|| SimError::UnknownTeam { team_id: team_id.to_string() })?;
        team.rating = rating;
        Ok(())
    }

    /// Add a team to a division. Its schedule is reset; the squad is
    /// generated on first use.
    pub fn add_team(&mut self, code: &str, name: &str, rating: f64) -> SimResult<TeamId> {
        validate_rating(rating)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow::anyhow!("team name must not be empty").into());
        }
        let id = self.next_team_id();
        let sigma = self.state.config.season_sigma;
        let division = find_division(&mut self.state.divisions, code)?;

        let mut team = Team::new(id.clone(), name.to_string(), rating);
        team.open_season(&mut self.rng, sigma);
        division.teams.push(team);
        division.reset_schedule();
        log::info!("added {name} ({id}) to division {code}");
        Ok(id)
    }

    /// Remove a team from the league and the cup. Its division's
    /// schedule is reset.
    pub fn remove_team(&mut self, team_id: &str) -> SimResult<()> {
        let division = self
            .state
            .divisions
            .iter_mut()
            .find(|d| d.contains(team_id))
            .ok_or_else(|| SimError::UnknownTeam { team_id: team_id.to_string() })?;
        division.teams.retain(|t| t.id != team_id);
        division.reset_schedule();
        self.state.cup.withdraw(team_id);
        log::info!("removed team {team_id}");
        Ok(())
    }

    fn next_team_id(&self) -> TeamId {
        let highest = self
            .state
            .divisions
            .iter()
            .flat_map(|d| d.teams.iter())
            .filter_map(|t| t.id.strip_prefix("t-").and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        format!("t-{:03}", highest + 1)
    }
}

fn find_division<'a>(divisions: &'a mut [Division], code: &str) -> SimResult<&'a mut Division> {
    divisions
        .iter_mut()
        .find(|d| d.code == code)
        .ok_or_else(|| SimError::UnknownDivision { code: code.to_string() })
}

fn validate_rating(rating: f64) -> SimResult<()> {
    if rating.is_finite() && (EDITABLE_RATING_MIN..=EDITABLE_RATING_MAX).contains(&rating) {
        Ok(())
    } else {
        Err(SimError::InvalidRating { rating })
    }
}
