//! Game engine boundary.
//!
//! The orchestration core treats a single game's simulation as a black box:
//! two team snapshots in, one `GameResult` out. All randomness flows through
//! the caller's seeded `ChaCha8Rng`, which the orchestrator owns and never
//! resets between trials; trial-to-trial outcomes therefore depend on the
//! stream's consumption order, and reproducibility comes from seeding the
//! stream, not from the engine.

mod rating;

pub use rating::RatingEngine;

use rand_chacha::ChaCha8Rng;

use crate::models::{GameResult, TeamSnapshot};

/// Everything a single simulation needs. `teams[0]` is the home side.
#[derive(Debug, Clone)]
pub struct GameInput {
    pub gid: u32,
    pub day: u16,
    pub teams: [TeamSnapshot; 2],
    pub want_trace: bool,

    /// Multiplier on the home-advantage strength bump; 1.0 is neutral.
    pub home_advantage_factor: f64,

    /// Structurally disable home advantage regardless of the factor.
    pub home_advantage_disabled: bool,

    pub is_exhibition: bool,

    /// Per player-minute chance of a new injury.
    pub base_injury_rate: f64,

    /// Whether the game may end tied; otherwise overtime decides it.
    pub allow_tie: bool,
}

pub trait GameEngine {
    fn simulate(&self, input: GameInput, rng: &mut ChaCha8Rng) -> GameResult;
}
