//! Day simulator: builds the day's matchup list and runs every game in it,
//! dispatching forced games through the outcome search.

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;

use crate::db::LeagueStore;
use crate::engine::{GameEngine, GameInput};
use crate::error::Result;
use crate::models::{ForcedOutcome, GameResult, Phase, ScheduledGame, TeamSnapshot};
use crate::notify::{LogEvent, NotificationSink};
use crate::season;
use crate::sim::lock::RunLock;
use crate::sim::outcome;

/// One day's collected results. `day_over` is false when a single live game
/// was simulated out of a fuller day.
#[derive(Debug)]
pub struct DayGames {
    pub results: Vec<GameResult>,
    pub day_over: bool,
}

/// Whether a forced tie is legal for the current league rules.
fn allow_force_tie(store: &LeagueStore) -> bool {
    store.attrs().ties && store.attrs().phase != Phase::Playoffs
}

/// Build snapshots for every team playing today. Snapshots carry zeroed
/// per-game stats; the difficulty handicap applies to the user's team.
fn load_teams(store: &LeagueStore, schedule: &[ScheduledGame]) -> Result<BTreeMap<i32, TeamSnapshot>> {
    let user_tid = store.attrs().user_tid;
    let difficulty = store.attrs().difficulty;

    let mut tids: Vec<i32> = schedule
        .iter()
        .flat_map(|g| [g.home_tid, g.away_tid])
        .collect();
    tids.sort_unstable();
    tids.dedup();

    let mut snapshots = BTreeMap::new();
    for tid in tids {
        let team = store.team(tid)?;
        let roster: Vec<&crate::models::Player> = store
            .pids_by_tid(tid)
            .into_iter()
            .map(|pid| store.player(pid))
            .collect::<Result<_>>()?;
        let scale = if tid == user_tid { difficulty } else { 0.0 };
        snapshots.insert(tid, TeamSnapshot::build(team, &roster, scale));
    }
    Ok(snapshots)
}

/// Simulate the next scheduled day (or one game of it).
///
/// Returns `None` when there is nothing to simulate, which ends the run.
pub fn simulate_day<E: GameEngine>(
    store: &mut LeagueStore,
    engine: &E,
    lock: &RunLock,
    sink: &mut dyn NotificationSink,
    rng: &mut ChaCha8Rng,
    single_gid: Option<u32>,
    want_trace: bool,
) -> Result<Option<DayGames>> {
    let mut schedule = season::games_for_next_day(store);

    if schedule.is_empty() && store.attrs().phase == Phase::Playoffs {
        // Sometimes the playoff schedule isn't made the day before, so make
        // it now. The next phase starts before this point once the playoffs
        // are over, so there are always games to create here.
        season::playoffs::new_schedule_playoffs_day(store, sink)?;
        schedule = season::games_for_next_day(store);
    }

    if schedule.is_empty() {
        return Ok(None);
    }

    // If live game sim, only do that one game, not the whole day.
    let mut day_over = true;
    if let Some(gid) = single_gid {
        let length_before = schedule.len();
        schedule.retain(|g| g.gid == gid);
        if schedule.len() < length_before {
            day_over = false;
        }
    }

    let teams = load_teams(store, &schedule)?;

    let god_mode = store.attrs().god_mode;
    let injury_rate = store.attrs().injury_rate;
    let phase = store.attrs().phase;
    let ties = store.attrs().ties;

    let mut results = Vec::with_capacity(schedule.len());

    for game in &schedule {
        let do_trace = want_trace && single_gid == Some(game.gid);

        let home = &teams[&game.home_tid];
        let away = &teams[&game.away_tid];

        // Fewer injuries in the exhibition game, none during the playoffs.
        let base_injury_rate = if game.is_all_star() {
            if phase == Phase::Playoffs {
                0.0
            } else {
                injury_rate / 4.0
            }
        } else {
            injury_rate
        };

        let allow_tie = ties && phase != Phase::Playoffs;

        let force_tie = game.force_win == Some(ForcedOutcome::Tie);
        let invalid_force_tie = force_tie && !allow_force_tie(store);

        let forced = if god_mode && !invalid_force_tie { game.force_win } else { None };

        if let Some(desired) = forced {
            let base = [home.clone(), away.clone()];

            match outcome::search_forced_outcome(
                engine,
                game,
                desired,
                &base,
                base_injury_rate,
                allow_tie,
                do_trace,
                rng,
            ) {
                Some(result) => results.push(result),
                None => {
                    // Exhausted the trial budget: report, halt after this
                    // day, and stop forcing this matchup so a later run can
                    // resolve it normally.
                    let text = match desired {
                        ForcedOutcome::Tie => format!(
                            "Could not find a simulation in {} tries where the {} tied the {}.",
                            outcome::NUM_TRIES,
                            store.team(game.home_tid)?.full_name(),
                            store.team(game.away_tid)?.full_name(),
                        ),
                        ForcedOutcome::Team(tid) => {
                            let other_tid =
                                if tid == game.home_tid { game.away_tid } else { game.home_tid };
                            format!(
                                "Could not find a simulation in {} tries where the {} beat the {}.",
                                outcome::NUM_TRIES,
                                store.team(tid)?.full_name(),
                                store.team(other_tid)?.full_name(),
                            )
                        }
                    };
                    sink.log_event(LogEvent::error(text).persistent());
                    lock.request_stop();
                    store.scheduled_game_mut(game.gid)?.force_win = None;
                }
            }
        } else {
            // Home advantage is structurally off for a one-game finals
            // format once the final round is underway.
            let disable_home_advantage = phase == Phase::Playoffs
                && store.playoffs().is_some_and(|po| po.in_single_game_finals());

            let result = engine.simulate(
                GameInput {
                    gid: game.gid,
                    day: game.day,
                    teams: [home.clone(), away.clone()],
                    want_trace: do_trace,
                    home_advantage_factor: 1.0,
                    home_advantage_disabled: disable_home_advantage || game.is_all_star(),
                    is_exhibition: game.is_all_star(),
                    base_injury_rate,
                    allow_tie,
                },
                rng,
            );
            results.push(result);
        }
    }

    Ok(Some(DayGames { results, day_over }))
}
