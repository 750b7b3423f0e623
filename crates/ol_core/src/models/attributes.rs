use serde::{Deserialize, Serialize};

use super::Phase;

/// Process-wide league configuration.
///
/// Read-only from the simulation core's perspective apart from `phase` (set
/// through phase transitions). Fields added after the first save format carry
/// `#[serde(default)]` so older snapshots deserialize with sane values
/// instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAttributes {
    pub season: u16,
    pub phase: Phase,

    /// Privileged editing mode; forced outcomes are honored only when set.
    #[serde(default)]
    pub god_mode: bool,

    /// Whether regular-season games may end tied.
    #[serde(default)]
    pub ties: bool,

    /// Per player-minute chance of a new injury.
    #[serde(default = "default_injury_rate")]
    pub injury_rate: f64,

    /// Per-day chance of a tragic event during the regular season.
    #[serde(default = "default_tragic_death_rate")]
    pub tragic_death_rate: f64,

    /// Halt the run after a day in which a user player was injured (or a
    /// tragic event occurred).
    #[serde(default)]
    pub stop_on_injury: bool,

    /// Games per playoff round, first round first. The number of rounds
    /// determines the bracket size.
    #[serde(default = "default_playoff_series")]
    pub num_games_playoff_series: Vec<u8>,

    #[serde(default = "default_max_roster_size")]
    pub max_roster_size: usize,

    #[serde(default = "default_min_roster_size")]
    pub min_roster_size: usize,

    /// Minimum contract amount, in thousands.
    #[serde(default = "default_min_contract")]
    pub min_contract: u32,

    /// The human-controlled franchise.
    #[serde(default = "default_user_tid")]
    pub user_tid: i32,

    /// Observer mode: the user's team is AI-run, so its roster is never a
    /// precondition failure.
    #[serde(default)]
    pub spectator: bool,

    /// Strength multiplier applied to the user's team (negative = harder).
    #[serde(default)]
    pub difficulty: f64,
}

fn default_injury_rate() -> f64 {
    0.0002
}

fn default_tragic_death_rate() -> f64 {
    1.0 / 90_000.0
}

fn default_playoff_series() -> Vec<u8> {
    vec![7, 7, 7, 7]
}

fn default_max_roster_size() -> usize {
    15
}

fn default_min_roster_size() -> usize {
    13
}

fn default_min_contract() -> u32 {
    750
}

fn default_user_tid() -> i32 {
    0
}

impl Default for GameAttributes {
    fn default() -> Self {
        Self {
            season: 1,
            phase: Phase::RegularSeason,
            god_mode: false,
            ties: false,
            injury_rate: default_injury_rate(),
            tragic_death_rate: default_tragic_death_rate(),
            stop_on_injury: false,
            num_games_playoff_series: default_playoff_series(),
            max_roster_size: default_max_roster_size(),
            min_roster_size: default_min_roster_size(),
            min_contract: default_min_contract(),
            user_tid: default_user_tid(),
            spectator: false,
            difficulty: 0.0,
        }
    }
}

impl GameAttributes {
    pub fn playoff_rounds(&self) -> usize {
        self.num_games_playoff_series.len()
    }

    pub fn num_playoff_teams(&self) -> usize {
        1 << self.playoff_rounds()
    }
}
