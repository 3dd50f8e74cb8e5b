use crate::types::DivisionCode;
use serde::{Deserialize, Serialize};

/// Teams swapped across every promotion/relegation boundary.
pub const PROMOTION_SLOTS: usize = 4;

/// Default number of teams each division sends to the cup.
pub const DEFAULT_CUP_INTAKE: usize = 16;

/// Rating assigned to teams whose stored rating is unusable.
pub const BASELINE_RATING: f64 = 72.0;

pub const TEAM_RATING_MIN: f64 = 50.0;
pub const TEAM_RATING_MAX: f64 = 95.0;

/// Spread of generated team ratings around their division base.
pub const TEAM_RATING_SPREAD: f64 = 6.0;

/// Bounds for ratings entered through commands.
pub const EDITABLE_RATING_MIN: f64 = 40.0;
pub const EDITABLE_RATING_MAX: f64 = 99.0;

/// Tunable parameters of the match model. Carried inside the snapshot so
/// an imported league keeps its own settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// League-wide mean of total goals per match.
    pub avg_goals: f64,
    /// Share bias toward the home side, in (-0.5, 0.5).
    pub home_edge: f64,
    /// Per-match performance noise sigma.
    pub perf_sigma: f64,
    /// Per-season form drift sigma.
    pub season_sigma: f64,
    /// Decide each division title with a top-4 knockout.
    pub playoffs: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            avg_goals:    2.7,
            home_edge:    0.12,
            perf_sigma:   0.08,
            season_sigma: 0.05,
            playoffs:     false,
        }
    }
}

impl SimConfig {
    /// Clamp every parameter into a range the match model can use.
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let pick = |v: f64, fallback: f64, lo: f64, hi: f64| {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        };
        Self {
            avg_goals:    pick(self.avg_goals, d.avg_goals, 0.0, 10.0),
            home_edge:    pick(self.home_edge, d.home_edge, -0.45, 0.45),
            perf_sigma:   pick(self.perf_sigma, d.perf_sigma, 0.0, 0.5),
            season_sigma: pick(self.season_sigma, d.season_sigma, 0.0, 0.5),
            playoffs:     self.playoffs,
        }
    }
}

/// Partial update for `SimConfig`, used by the set_config command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub avg_goals: Option<f64>,
    #[serde(default)]
    pub home_edge: Option<f64>,
    #[serde(default)]
    pub perf_sigma: Option<f64>,
    #[serde(default)]
    pub season_sigma: Option<f64>,
    #[serde(default)]
    pub playoffs: Option<bool>,
}

impl ConfigPatch {
    pub fn apply_to(&self, config: &SimConfig) -> SimConfig {
        SimConfig {
            avg_goals:    self.avg_goals.unwrap_or(config.avg_goals),
            home_edge:    self.home_edge.unwrap_or(config.home_edge),
            perf_sigma:   self.perf_sigma.unwrap_or(config.perf_sigma),
            season_sigma: self.season_sigma.unwrap_or(config.season_sigma),
            playoffs:     self.playoffs.unwrap_or(config.playoffs),
        }
        .sanitized()
    }
}

// ── League setup ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionSetup {
    pub code: DivisionCode,
    pub name: String,
    /// Mean rating of the generated teams.
    pub base_rating: f64,
    pub teams: Vec<String>,
}

/// The divisions a fresh league starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSetup {
    #[serde(default)]
    pub config: SimConfig,
    pub divisions: Vec<DivisionSetup>,
}

impl LeagueSetup {
    /// Load from `<data_dir>/league.json`.
    /// In tests, use LeagueSetup::default_setup().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/league.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut setup: LeagueSetup = serde_json::from_str(&content)?;
        setup.config = setup.config.sanitized();
        if setup.divisions.is_empty() {
            anyhow::bail!("{path} defines no divisions");
        }
        Ok(setup)
    }

    /// The built-in three-division league.
    pub fn default_setup() -> Self {
        let division = |code: &str, base: f64, teams: [&str; 10]| DivisionSetup {
            code: code.into(),
            name: format!("Division {code}"),
            base_rating: base,
            teams: teams.iter().map(|t| t.to_string()).collect(),
        };
        Self {
            config: SimConfig::default(),
            divisions: vec![
                division("A", 82.0, [
                    "Lany", "Cornixho", "Pika", "Cloni", "Ameno",
                    "Monk", "Glokk", "Pau", "A01", "FF",
                ]),
                division("B", 76.0, [
                    "Sexo", "Foger", "Remo", "FDS", "Pila",
                    "Ameroca", "Amor", "Ploca", "Stone", "Del Zap",
                ]),
                division("C", 70.0, [
                    "City", "Light", "Freezer", "Heand", "Red Hot",
                    "Kira", "Tu Zap", "Pinko", "Block", "Lanus",
                ]),
            ],
        }
    }

    /// A small two-division league for unit tests.
    pub fn default_test() -> Self {
        let mut setup = Self::default_setup();
        setup.divisions.truncate(2);
        setup
    }
}
