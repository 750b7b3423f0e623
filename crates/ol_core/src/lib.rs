//! # ol_core - League Season Orchestration Engine
//!
//! This library advances a simulated sports league day by day: it decides
//! which games to simulate, runs them (honoring god-mode forced outcomes
//! through a bounded stochastic search), applies their consequences, and
//! transitions between season phases.
//!
//! ## Features
//! - Deterministic orchestration (same seed + same league = same season)
//! - Forced-outcome search with adaptive home-advantage bias
//! - End-of-day bookkeeping: injuries, fatigue, trades, free agency
//! - Compressed, checksummed league snapshots

// Game orchestration APIs juggle store, engine, lock, sink and rng together.
#![allow(clippy::too_many_arguments)]

pub mod db;
pub mod engine;
pub mod error;
pub mod free_agents;
pub mod models;
pub mod notify;
pub mod phase;
pub mod roster;
pub mod save;
pub mod season;
pub mod sim;
pub mod stats;
pub mod trade;

// Re-export the main orchestration surface
pub use db::LeagueStore;
pub use engine::{GameEngine, GameInput, RatingEngine};
pub use error::{LeagueError, Result};
pub use models::{
    ForcedOutcome, GameAttributes, GameResult, Phase, Player, ScheduledGame, Team, TeamSnapshot,
};
pub use notify::{EventBuffer, LogEvent, NotificationSink, UiHint};
pub use save::{SaveError, SaveManager};
pub use sim::{AdvanceController, AdvanceOptions, RunLock};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
