//! Snapshot serialization: the whole league to and from JSON.
//!
//! The snapshot is the only boundary object. Import is forgiving: serde
//! fills in what is missing, `lenient` swallows what is malformed, and
//! `repair` pulls whatever parsed back inside the invariants.

use crate::{
    config::{LeagueSetup, SimConfig, BASELINE_RATING, DEFAULT_CUP_INTAKE, TEAM_RATING_MAX, TEAM_RATING_MIN, TEAM_RATING_SPREAD},
    cup::Cup,
    division::Division,
    error::{SimError, SimResult},
    rng::SimRng,
    scorers::ScoringLeaderboard,
    season::SeasonSummary,
    standings,
    team::{Team, SEASON_MULTIPLIER_MAX, SEASON_MULTIPLIER_MIN},
    types::SeasonNo,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const FIRST_SEASON: SeasonNo = 1;

/// Field-level deserializers that never fail on bad data.
pub mod lenient {
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    pub fn nan() -> f64 {
        f64::NAN
    }

    /// Numbers and numeric strings parse; anything else becomes NaN for
    /// the repair pass to replace.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        })
    }

    /// Marks a counter that was present but unusable. `repair` resets it.
    pub const UNREADABLE: u32 = u32::MAX;

    fn whole_number(value: Option<Value>) -> Option<u32> {
        let parsed = match value? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
                .and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.filter(|&n| n != UNREADABLE)
    }

    /// Non-negative integers and integer strings parse; anything else
    /// becomes `UNREADABLE`.
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(whole_number(value).unwrap_or(UNREADABLE))
    }

    /// Like `count`, with zero standing in for an unusable size.
    pub fn size<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(whole_number(value).map_or(0, |n| n as usize))
    }

    /// An absent or null value is `None`; anything else goes through
    /// `number`.
    pub fn optional_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(n.as_f64().unwrap_or(f64::NAN)),
            Some(Value::String(s)) => Some(s.trim().parse().unwrap_or(f64::NAN)),
            Some(_) => Some(f64::NAN),
        })
    }

    /// A map of counters; unusable values become `UNREADABLE`, a
    /// non-object becomes an empty map.
    pub fn counts<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, u32>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Object(entries)) => entries
                .into_iter()
                .map(|(k, v)| (k, whole_number(Some(v)).unwrap_or(UNREADABLE)))
                .collect(),
            _ => BTreeMap::new(),
        })
    }

    /// Keep the elements that parse, drop the rest. A missing, null or
    /// non-array value is an empty list.
    pub fn vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = match Option::<Value>::deserialize(d)? {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => return Ok(Vec::new()),
            Some(other) => {
                log::warn!("expected a list, found {other}; using an empty one");
                return Ok(Vec::new());
            }
        };
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("dropping malformed entry: {e}");
                    None
                }
            })
            .collect())
    }

    /// Whole sub-objects that fail to parse fall back to their default.
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value
            .and_then(|v| match serde_json::from_value(v) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    log::warn!("replacing malformed section with defaults: {e}");
                    None
                }
            })
            .unwrap_or_default())
    }
}

fn first_season() -> SeasonNo {
    FIRST_SEASON
}

/// Complete league state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    #[serde(default = "first_season", deserialize_with = "lenient::count")]
    pub season: SeasonNo,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub config: SimConfig,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub divisions: Vec<Division>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub cup: Cup,
    /// Closed seasons, oldest first.
    #[serde(default, deserialize_with = "lenient::vec")]
    pub history: Vec<SeasonSummary>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub scorers: ScoringLeaderboard,
}

impl Default for LeagueSnapshot {
    fn default() -> Self {
        Self {
            season:    FIRST_SEASON,
            config:    SimConfig::default(),
            divisions: Vec::new(),
            cup:       Cup::default(),
            history:   Vec::new(),
            scorers:   ScoringLeaderboard::default(),
        }
    }
}

/// What the repair pass changed, one line per fix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    pub notes: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.notes.is_empty()
    }

    fn note(&mut self, message: String) {
        log::warn!("repair: {message}");
        self.notes.push(message);
    }
}

impl LeagueSnapshot {
    /// Generate a fresh season-one league from a setup.
    /// Team ids are `t-001`, `t-002`, … across the whole league.
    pub fn from_setup(setup: &LeagueSetup, rng: &mut SimRng) -> Self {
        let mut next_id = 1;
        let divisions = setup
            .divisions
            .iter()
            .map(|d| {
                let teams = d
                    .teams
                    .iter()
                    .map(|name| {
                        let raw = d.base_rating + rng.normal(0.0, TEAM_RATING_SPREAD);
                        let rating = ((raw * 10.0).round() / 10.0).clamp(TEAM_RATING_MIN, TEAM_RATING_MAX);
                        let team = Team::new(format!("t-{next_id:03}"), name.clone(), rating);
                        next_id += 1;
                        team
                    })
                    .collect();
                Division::new(d.code.clone(), d.name.clone(), teams)
            })
            .collect();

        Self {
            season: FIRST_SEASON,
            config: setup.config.sanitized(),
            divisions,
            cup: Cup::default(),
            history: Vec::new(),
            scorers: ScoringLeaderboard::default(),
        }
    }

    /// Parse a snapshot. Malformed JSON is `SimError::InvalidSnapshot`;
    /// structurally odd but parseable input still needs `repair`.
    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(|e| SimError::InvalidSnapshot { reason: e.to_string() })
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn team_count(&self) -> usize {
        self.divisions.iter().map(|d| d.teams.len()).sum()
    }

    /// Pull the state back inside the invariants. Never fails.
    pub fn repair(&mut self) -> RepairReport {
        let mut report = RepairReport::default();

        let sanitized = self.config.sanitized();
        if sanitized != self.config {
            report.note("simulation parameters clamped to usable ranges".into());
            self.config = sanitized;
        }
        if self.season == lenient::UNREADABLE {
            report.note(format!("unreadable season reset to {FIRST_SEASON}"));
            self.season = FIRST_SEASON;
        } else if self.season < FIRST_SEASON {
            report.note(format!("season {} raised to {FIRST_SEASON}", self.season));
            self.season = FIRST_SEASON;
        }

        let mut codes = HashSet::new();
        self.divisions.retain(|d| {
            let fresh = !d.code.is_empty() && codes.insert(d.code.clone());
            if !fresh {
                report.note(format!("dropped division with empty or repeated code {:?}", d.code));
            }
            fresh
        });

        let mut seen_teams = HashSet::new();
        for division in &mut self.divisions {
            repair_teams(division, &mut seen_teams, &mut report);
            repair_fixtures(division, &mut report);
            if division.fixtures.is_empty() {
                division.table.clear();
            } else {
                standings::refresh(division);
            }
        }

        if self.cup.per_division == 0 {
            report.note(format!("cup intake reset to {DEFAULT_CUP_INTAKE}"));
            self.cup.per_division = DEFAULT_CUP_INTAKE;
        }
        if reset_unreadable(&mut self.cup.season_of, 0) {
            report.note("unreadable cup season reset".into());
        }
        let before = self.cup.alive.len();
        self.cup.alive.retain(|id| seen_teams.contains(id));
        if self.cup.alive.len() != before {
            report.note(format!("dropped {} unknown team(s) from the cup", before - self.cup.alive.len()));
        }
        if let Some(champion) = &self.cup.champion {
            if !seen_teams.contains(champion) {
                report.note(format!("cleared unknown cup champion {champion}"));
                self.cup.champion = None;
            }
        }

        report
    }
}

fn repair_teams(division: &mut Division, seen: &mut HashSet<String>, report: &mut RepairReport) {
    let code = division.code.clone();
    division.teams.retain(|t| {
        if t.id.is_empty() || t.name.is_empty() {
            report.note(format!("division {code}: dropped a team without id or name"));
            return false;
        }
        if !seen.insert(t.id.clone()) {
            report.note(format!("division {code}: dropped duplicate team {}", t.id));
            return false;
        }
        true
    });

    for team in &mut division.teams {
        if !team.rating.is_finite() {
            report.note(format!("team {}: rating reset to {BASELINE_RATING}", team.id));
            team.rating = BASELINE_RATING;
        }
        if let Some(m) = team.season_multiplier {
            let fixed = if m.is_finite() { m.clamp(SEASON_MULTIPLIER_MIN, SEASON_MULTIPLIER_MAX) } else { 1.0 };
            if fixed != m {
                report.note(format!("team {}: season multiplier {m} replaced by {fixed}", team.id));
                team.season_multiplier = Some(fixed);
            }
        }
        let before = team.titles.len();
        team.titles.retain(|_, n| *n != lenient::UNREADABLE);
        if reset_unreadable(&mut team.cup_titles, 0) || team.titles.len() != before {
            report.note(format!("team {}: unreadable title counts dropped", team.id));
        }

        let rating = team.rating;
        let mut fixed_ratings = 0;
        let mut fixed_counters = 0;
        for player in &mut team.players {
            if !player.overall.is_finite() {
                player.overall = rating;
                fixed_ratings += 1;
            }
            let counters = [
                &mut player.goals,
                &mut player.yellow_cards,
                &mut player.red_cards,
                &mut player.appearances,
                &mut player.injured_until,
                &mut player.suspended_until,
            ];
            fixed_counters += counters.into_iter().map(|c| reset_unreadable(c, 0)).filter(|&r| r).count();
        }
        if fixed_ratings > 0 {
            report.note(format!("team {}: {fixed_ratings} player rating(s) reset to team rating", team.id));
        }
        if fixed_counters > 0 {
            report.note(format!("team {}: {fixed_counters} unreadable player counter(s) reset to 0", team.id));
        }
    }
}

fn repair_fixtures(division: &mut Division, report: &mut RepairReport) {
    let members: HashSet<String> = division.teams.iter().map(|t| t.id.clone()).collect();
    let before = division.fixtures.len();
    division.fixtures.retain(|round| {
        let mut in_round = HashSet::new();
        round.iter().all(|f| {
            f.home != f.away
                && members.contains(&f.home)
                && members.contains(&f.away)
                && in_round.insert(f.home.as_str())
                && in_round.insert(f.away.as_str())
        })
    });
    if division.fixtures.len() != before {
        report.note(format!(
            "division {}: dropped {} malformed round(s)",
            division.code,
            before - division.fixtures.len()
        ));
    }

    for fixture in division.fixtures.iter_mut().flatten() {
        if fixture.played && fixture.score.is_none() {
            fixture.played = false;
            fixture.detail = None;
        }
    }

    if reset_unreadable(&mut division.round, 0) {
        report.note(format!("division {}: unreadable round counter reset to 0", division.code));
    }
    if division.round > division.total_rounds() {
        report.note(format!(
            "division {}: round {} clamped to {}",
            division.code,
            division.round,
            division.total_rounds()
        ));
        division.round = division.total_rounds();
    }
}

/// Replace an `UNREADABLE` counter with `fallback`. True when it did.
fn reset_unreadable(value: &mut u32, fallback: u32) -> bool {
    let unreadable = *value == lenient::UNREADABLE;
    if unreadable {
        *value = fallback;
    }
    unreadable
}
