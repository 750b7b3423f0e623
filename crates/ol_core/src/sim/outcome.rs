//! Forced-outcome search.
//!
//! Re-simulates one matchup on fresh copies of the same snapshots, nudging
//! the home-advantage factor, until the scripted winner or tie appears or
//! the trial budget runs out. Trials share the caller's random stream, so
//! individual trials are not reproducible in isolation; the search as a
//! whole is, given the stream's starting state.

use rand_chacha::ChaCha8Rng;

use crate::engine::{GameEngine, GameInput};
use crate::models::{ForcedOutcome, GameResult, ScheduledGame, TeamSnapshot};

/// Trial budget per forced game.
pub const NUM_TRIES: u32 = 2000;

/// Trials run with a neutral factor before the bias ramp begins.
pub const START_CHANGING_HOME_ADVANTAGE: u32 = NUM_TRIES / 4;

/// Search for a simulation matching the desired outcome.
///
/// Returns `None` when the budget is exhausted; the caller reports the
/// failure and decides what happens to the game. On success the result
/// carries the 1-based trial index that produced it.
pub fn search_forced_outcome<E: GameEngine + ?Sized>(
    engine: &E,
    game: &ScheduledGame,
    desired: ForcedOutcome,
    teams: &[TeamSnapshot; 2],
    base_injury_rate: f64,
    allow_tie: bool,
    want_trace: bool,
    rng: &mut ChaCha8Rng,
) -> Option<GameResult> {
    let force_tie = desired == ForcedOutcome::Tie;
    let force_win_home = desired == ForcedOutcome::Team(game.home_tid);

    let mut home_advantage_factor = 1.0;
    let mut home_won_last_game = false;
    let mut home_won_counter: i64 = 0;

    for i in 0..NUM_TRIES {
        if i >= START_CHANGING_HOME_ADVANTAGE {
            if !force_tie {
                // Scale from 1x to 3x linearly, after staying at 1x for some time
                home_advantage_factor = 1.0
                    + (2.0 * (i - START_CHANGING_HOME_ADVANTAGE) as f64)
                        / (NUM_TRIES - START_CHANGING_HOME_ADVANTAGE) as f64;

                if !force_win_home {
                    home_advantage_factor = 1.0 / home_advantage_factor;
                }
            } else {
                // Track which side keeps winning, only past the ramp point.
                if home_won_last_game {
                    home_won_counter += 1;
                } else {
                    home_won_counter -= 1;
                }

                // Scale from 1 to 3, where 3 happens when the counter is 1000
                home_advantage_factor =
                    1.0 + (home_won_counter.unsigned_abs() as f64 * 2.0 / 1000.0).min(2.0);

                if home_won_counter > 0 {
                    home_advantage_factor = 1.0 / home_advantage_factor;
                }
            }
        }

        // Fresh copies so per-game stats start at zero each trial.
        let result = engine.simulate(
            GameInput {
                gid: game.gid,
                day: game.day,
                teams: teams.clone(),
                want_trace,
                home_advantage_factor,
                home_advantage_disabled: false,
                is_exhibition: game.is_all_star(),
                base_injury_rate,
                allow_tie,
            },
            rng,
        );

        let won_tid = result.winner_tid();
        home_won_last_game = won_tid == Some(game.home_tid);

        let success = match desired {
            ForcedOutcome::Tie => won_tid.is_none(),
            ForcedOutcome::Team(tid) => won_tid == Some(tid),
        };

        if success {
            let mut result = result;
            result.force_win_trials = Some(i + 1);
            log::debug!("Forced outcome for game {} found on trial {}", game.gid, i + 1);
            return Some(result);
        }
    }

    None
}
