//! Day-advancement controller.
//!
//! Plays one or more days of games, handling the cases where there are no
//! more games to play by switching the phase to either the playoffs or the
//! draft lottery, as appropriate. The loop is an explicit state machine:
//! each iteration resolves exactly one day and yields a `DayOutcome`, so no
//! call-stack growth accumulates across simulated days.

use rand_chacha::ChaCha8Rng;

use crate::db::LeagueStore;
use crate::engine::GameEngine;
use crate::error::Result;
use crate::models::Phase;
use crate::notify::{LogEvent, NotificationSink, UiHint};
use crate::phase;
use crate::roster::{self, RosterScope};
use crate::save::SaveManager;
use crate::season;
use crate::season::playoffs;
use crate::sim::day;
use crate::sim::lock::RunLock;
use crate::sim::results;

#[derive(Debug, Clone)]
pub struct AdvanceOptions {
    /// Days to simulate. Larger than the remaining schedule simply plays
    /// out the current phase.
    pub days: u32,

    /// A new request from the user (acquire the lock, check preconditions)
    /// rather than a programmatic continuation.
    pub user_initiated: bool,

    /// Simulate only this game out of the day, live.
    pub single_gid: Option<u32>,

    /// Collect the play-by-play trace for the live game.
    pub want_trace: bool,
}

impl AdvanceOptions {
    pub fn days(days: u32) -> Self {
        Self { days, user_initiated: true, single_gid: None, want_trace: false }
    }

    pub fn live_game(gid: u32) -> Self {
        Self { days: 1, user_initiated: true, single_gid: Some(gid), want_trace: true }
    }
}

/// What one day of work decided.
enum DayOutcome {
    /// Day resolved; keep going.
    Continue,
    /// No more days to run; finish up cleanly.
    Finished { playoffs_over: bool },
    /// Precondition failure already reported; stop without the finish path.
    Aborted,
}

pub struct AdvanceController<'a, E: GameEngine> {
    pub store: &'a mut LeagueStore,
    pub engine: &'a E,
    pub lock: &'a RunLock,
    pub sink: &'a mut dyn NotificationSink,
    pub rng: &'a mut ChaCha8Rng,

    /// When set, the end-of-run persistence flush writes here.
    pub saves: Option<&'a SaveManager>,
}

impl<'a, E: GameEngine> AdvanceController<'a, E> {
    /// Play `opts.days` days of games.
    ///
    /// User-initiated runs first acquire the run lock; if another run is
    /// active the request is refused with a user-visible error and no side
    /// effects. All other failures release the lock before propagating.
    pub fn advance(&mut self, opts: AdvanceOptions) -> Result<()> {
        if opts.user_initiated {
            if !self.lock.try_acquire() {
                self.sink
                    .log_event(LogEvent::error("A simulation is already in progress."));
                return Ok(());
            }
        }

        let mut days_remaining = opts.days;
        let mut first = true;

        loop {
            let outcome = match self.run_day(&mut days_remaining, first, &opts) {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.lock.release();
                    return Err(err);
                }
            };
            first = false;

            match outcome {
                DayOutcome::Continue => {}
                DayOutcome::Finished { playoffs_over } => {
                    if let Err(err) = self.finish(playoffs_over, &opts) {
                        self.lock.release();
                        return Err(err);
                    }
                    break;
                }
                DayOutcome::Aborted => break,
            }
        }

        Ok(())
    }

    /// Resolve one day of work.
    fn run_day(
        &mut self,
        days_remaining: &mut u32,
        first: bool,
        opts: &AdvanceOptions,
    ) -> Result<DayOutcome> {
        // Precondition: the user's roster must be legal before anything
        // simulates.
        if let Some(error_text) =
            roster::check_roster_sizes(self.store, self.rng, RosterScope::User)?
        {
            self.lock.release();
            self.sink.log_event(LogEvent::error(error_text));
            return Ok(DayOutcome::Aborted);
        }

        if *days_remaining == 0 {
            // Nothing left to run; during the playoffs, still advance the
            // playoff calendar so a finished bracket is noticed.
            let playoffs_over = self.store.attrs().phase == Phase::Playoffs
                && playoffs::new_schedule_playoffs_day(self.store, self.sink)?;
            return Ok(DayOutcome::Finished { playoffs_over });
        }

        // The stop flag takes effect only at day boundaries. The initiating
        // call instead clears a stale request and proceeds.
        let stop_requested = self.lock.stop_requested();
        if first && opts.user_initiated {
            if stop_requested {
                self.lock.clear_stop();
            }
        } else if stop_requested {
            return Ok(DayOutcome::Finished { playoffs_over: false });
        }

        if self.store.attrs().phase != Phase::Playoffs {
            // AI rosters are auto-fixed, never an error.
            roster::check_roster_sizes(self.store, self.rng, RosterScope::Other)?;
        }

        // Trade-deadline placeholder: no game today. Remove it, advance the
        // phase, and keep going with one fewer day.
        let schedule = season::games_for_next_day(self.store);
        if let Some(first_game) = schedule.first() {
            if first_game.is_trade_deadline() {
                let gid = first_game.gid;
                self.store.delete_scheduled_game(gid)?;
                phase::new_phase(self.store, self.sink, Phase::AfterTradeDeadline)?;
                self.sink.ui_hint(UiHint::DeleteGames { gids: vec![gid] });
                *days_remaining -= 1;
                return Ok(DayOutcome::Continue);
            }
        }

        let Some(day_games) = day::simulate_day(
            self.store,
            self.engine,
            self.lock,
            self.sink,
            self.rng,
            opts.single_gid,
            opts.want_trace,
        )?
        else {
            return Ok(DayOutcome::Finished { playoffs_over: false });
        };

        let report = results::process_day_results(
            self.store,
            self.lock,
            self.sink,
            self.rng,
            day_games.results,
            day_games.day_over,
            opts.single_gid,
            opts.want_trace,
        )?;

        *days_remaining -= 1;

        if *days_remaining == 0 || report.playoffs_over {
            return Ok(DayOutcome::Finished { playoffs_over: report.playoffs_over });
        }
        Ok(DayOutcome::Continue)
    }

    /// Clean termination: flush, release the lock, re-check the schedule
    /// for a phase transition, and point the user at the all-star game when
    /// it is up next.
    fn finish(&mut self, playoffs_over: bool, opts: &AdvanceOptions) -> Result<()> {
        if let Some(saves) = self.saves {
            saves.auto_save(self.store)?;
        }

        self.lock.release();

        // Check to see if the season is over.
        let schedule = self.store.schedule_ordered();
        if self.store.attrs().phase < Phase::Playoffs {
            if schedule.is_empty() {
                phase::new_phase(self.store, self.sink, Phase::Playoffs)?;
            }
        } else if playoffs_over {
            phase::new_phase(self.store, self.sink, Phase::DraftLottery)?;
        }

        if !schedule.is_empty() && !playoffs_over {
            if season::next_game_is_all_star(&schedule) && opts.single_gid.is_none() {
                self.sink.log_event(LogEvent::info(
                    "The All-Star Game is the next scheduled game.",
                ));
            }
        }

        log::debug!("Run finished (playoffs_over: {})", playoffs_over);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GameEngine, GameInput, RatingEngine};
    use crate::models::{
        ForcedOutcome, GameAttributes, GameResult, Player, Team, TeamGameLine, TeamLine,
        ALL_STAR_AWAY_TID, ALL_STAR_HOME_TID, TRADE_DEADLINE_TID,
    };
    use crate::notify::EventBuffer;
    use rand::SeedableRng;

    fn league(num_teams: i32, roster_size: usize) -> LeagueStore {
        let mut attrs = GameAttributes::default();
        attrs.min_roster_size = roster_size.min(5);
        attrs.max_roster_size = roster_size.max(15);
        attrs.num_games_playoff_series = vec![1];
        attrs.tragic_death_rate = 0.0;
        let mut store = LeagueStore::new(attrs);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for tid in 0..num_teams {
            store.put_team(Team::new(tid, "City", &format!("T{tid}")));
            for _ in 0..roster_size {
                let pid = store.next_pid();
                let mut p = Player::gen_random_free_agent(pid, 1, 750, &mut rng);
                p.tid = tid;
                p.ratings.ovr = 60;
                store.put_player(p);
            }
        }
        store
    }

    fn advance(store: &mut LeagueStore, opts: AdvanceOptions) -> (EventBuffer, RunLock) {
        let engine = RatingEngine::new();
        let lock = RunLock::new();
        let mut sink = EventBuffer::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        {
            let mut controller = AdvanceController {
                store,
                engine: &engine,
                lock: &lock,
                sink: &mut sink,
                rng: &mut rng,
                saves: None,
            };
            controller.advance(opts).unwrap();
        }
        (sink, lock)
    }

    /// Three scheduled days, one ordinary game per day. All three resolve,
    /// the schedule empties, and the phase check fires.
    #[test]
    fn test_three_sequential_days() {
        let mut store = league(2, 8);
        for d in 1..=3 {
            store.add_scheduled_game(d, 0, 1);
        }

        let (_, lock) = advance(&mut store, AdvanceOptions::days(3));

        assert_eq!(store.game_results().count(), 3);
        // The schedule emptied, so the finish path advanced the phase and
        // built the playoff bracket.
        assert_eq!(store.attrs().phase, Phase::Playoffs);
        assert!(store.playoffs().is_some());
        assert!(!lock.is_running());
    }

    #[test]
    fn test_fewer_days_than_schedule_stops_early() {
        let mut store = league(2, 8);
        for d in 1..=5 {
            store.add_scheduled_game(d, 0, 1);
        }

        advance(&mut store, AdvanceOptions::days(2));

        assert_eq!(store.game_results().count(), 2);
        assert_eq!(store.schedule_len(), 3);
        assert_eq!(store.attrs().phase, Phase::RegularSeason);
    }

    /// The trade-deadline placeholder is removed without simulating, the
    /// phase advances, and the loop continues into the next day with one
    /// fewer day of budget.
    #[test]
    fn test_trade_deadline_placeholder() {
        let mut store = league(2, 8);
        store.add_scheduled_game(1, TRADE_DEADLINE_TID, TRADE_DEADLINE_TID);
        store.add_scheduled_game(2, 0, 1);

        let (sink, _) = advance(&mut store, AdvanceOptions::days(2));

        // The placeholder was consumed by the phase change, not simulated;
        // the remaining budget covered the real game.
        assert_eq!(store.attrs().phase, Phase::Playoffs); // Schedule emptied afterward.
        assert_eq!(store.game_results().count(), 1);
        assert!(sink
            .hints
            .iter()
            .any(|h| matches!(h, UiHint::DeleteGames { gids } if gids.len() == 1)));
        assert!(sink.events.iter().any(|e| e.text.contains("trade deadline")));
    }

    #[test]
    fn test_trade_deadline_alone_does_not_consume_game_budget() {
        let mut store = league(2, 8);
        store.add_scheduled_game(1, TRADE_DEADLINE_TID, TRADE_DEADLINE_TID);
        store.add_scheduled_game(2, 0, 1);

        advance(&mut store, AdvanceOptions::days(1));

        // One day of budget went to the placeholder; the real game is still
        // scheduled and the phase reflects the deadline passing.
        assert_eq!(store.game_results().count(), 0);
        assert_eq!(store.schedule_len(), 1);
        assert_eq!(store.attrs().phase, Phase::AfterTradeDeadline);
    }

    #[test]
    fn test_lock_refuses_concurrent_run() {
        let mut store = league(2, 8);
        store.add_scheduled_game(1, 0, 1);

        let engine = RatingEngine::new();
        let lock = RunLock::new();
        assert!(lock.try_acquire()); // Another run is active.

        let mut sink = EventBuffer::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut controller = AdvanceController {
            store: &mut store,
            engine: &engine,
            lock: &lock,
            sink: &mut sink,
            rng: &mut rng,
            saves: None,
        };
        controller.advance(AdvanceOptions::days(1)).unwrap();

        // Refused without side effects.
        assert_eq!(controller.store.game_results().count(), 0);
        assert!(sink.errors().any(|e| e.text.contains("already in progress")));
    }

    #[test]
    fn test_illegal_user_roster_aborts_before_simulating() {
        let mut store = league(2, 8);
        store.attrs_mut().min_roster_size = 10; // User roster of 8 is illegal.
        store.attrs_mut().user_tid = 0;
        store.add_scheduled_game(1, 0, 1);

        let (sink, lock) = advance(&mut store, AdvanceOptions::days(1));

        assert_eq!(store.game_results().count(), 0);
        assert_eq!(store.schedule_len(), 1);
        assert!(!lock.is_running());
        assert!(sink.errors().any(|e| e.text.contains("minimum number of players")));
    }

    #[test]
    fn test_stop_flag_halts_between_days() {
        let mut store = league(2, 8);
        for d in 1..=4 {
            store.add_scheduled_game(d, 0, 1);
        }

        // Stop requested before a continuation (non-user) run: nothing runs.
        let engine = RatingEngine::new();
        let lock = RunLock::new();
        lock.request_stop();
        let mut sink = EventBuffer::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut controller = AdvanceController {
            store: &mut store,
            engine: &engine,
            lock: &lock,
            sink: &mut sink,
            rng: &mut rng,
            saves: None,
        };
        controller
            .advance(AdvanceOptions {
                days: 4,
                user_initiated: false,
                single_gid: None,
                want_trace: false,
            })
            .unwrap();
        assert_eq!(controller.store.game_results().count(), 0);
    }

    #[test]
    fn test_user_start_clears_stale_stop_flag() {
        let mut store = league(2, 8);
        store.add_scheduled_game(1, 0, 1);

        let engine = RatingEngine::new();
        let lock = RunLock::new();
        lock.request_stop(); // Stale from a previous run.
        let mut sink = EventBuffer::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut controller = AdvanceController {
            store: &mut store,
            engine: &engine,
            lock: &lock,
            sink: &mut sink,
            rng: &mut rng,
            saves: None,
        };
        controller.advance(AdvanceOptions::days(1)).unwrap();

        assert_eq!(controller.store.game_results().count(), 1);
        assert!(!lock.stop_requested());
    }

    /// Playoffs run to completion and hand off to the draft lottery.
    #[test]
    fn test_playoffs_through_draft_lottery() {
        let mut store = league(4, 8);
        // Give teams distinct records so seeding is stable.
        for tid in 0..4 {
            store.team_mut(tid).unwrap().record.won = (10 - tid) as u32;
        }
        let mut sink = EventBuffer::new();
        phase::new_phase(&mut store, &mut sink, Phase::Playoffs).unwrap();

        // Single-game rounds: 2 semifinal days + finals day.
        let (_, _) = advance(&mut store, AdvanceOptions::days(10));

        assert_eq!(store.attrs().phase, Phase::DraftLottery);
        assert!(store.playoffs().unwrap().champion.is_some());
        assert_eq!(store.schedule_len(), 0);
    }

    #[test]
    fn test_all_star_notification_when_next() {
        let mut store = league(2, 8);
        // Store-backed exhibition rosters.
        store.put_team(Team::new(ALL_STAR_HOME_TID, "All-Stars", "Home"));
        store.put_team(Team::new(ALL_STAR_AWAY_TID, "All-Stars", "Away"));
        store.add_scheduled_game(1, 0, 1);
        store.add_scheduled_game(2, ALL_STAR_HOME_TID, ALL_STAR_AWAY_TID);

        let (sink, _) = advance(&mut store, AdvanceOptions::days(1));

        assert!(sink.events.iter().any(|e| e.text.contains("All-Star")));
    }

    /// A forced tie that cannot happen exhausts the trial budget, leaves
    /// the game scheduled, reports a persistent error naming both
    /// franchises, and sets the stop flag.
    #[test]
    fn test_forced_tie_exhaustion() {
        /// Home always wins by ten; a tie can never appear.
        struct HomeAlwaysWins;
        impl GameEngine for HomeAlwaysWins {
            fn simulate(&self, input: GameInput, _rng: &mut ChaCha8Rng) -> GameResult {
                GameResult {
                    gid: input.gid,
                    day: input.day,
                    teams: [
                        TeamLine {
                            tid: input.teams[0].id,
                            stat: TeamGameLine { pts: 100, ..Default::default() },
                        },
                        TeamLine {
                            tid: input.teams[1].id,
                            stat: TeamGameLine { pts: 90, ..Default::default() },
                        },
                    ],
                    players: Vec::new(),
                    play_by_play: None,
                    force_win_trials: None,
                }
            }
        }

        let mut store = league(2, 8);
        store.attrs_mut().god_mode = true;
        store.attrs_mut().ties = true;
        let gid = store.add_scheduled_game(1, 0, 1);
        store.scheduled_game_mut(gid).unwrap().force_win = Some(ForcedOutcome::Tie);
        store.add_scheduled_game(2, 1, 0);

        let engine = HomeAlwaysWins;
        let lock = RunLock::new();
        let mut sink = EventBuffer::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut controller = AdvanceController {
            store: &mut store,
            engine: &engine,
            lock: &lock,
            sink: &mut sink,
            rng: &mut rng,
            saves: None,
        };
        controller.advance(AdvanceOptions::days(2)).unwrap();

        // No result recorded and the schedule entry survives...
        assert!(store.scheduled_game(gid).is_ok());
        assert!(store.game_result(gid).is_err());
        // ...but forcing was disabled so a later run can resolve it.
        assert_eq!(store.scheduled_game(gid).unwrap().force_win, None);

        assert!(lock.stop_requested());
        let error = sink.errors().next().expect("persistent error");
        assert!(error.persistent);
        assert!(error.text.contains("tied"));
        assert!(error.text.contains("City T0"));
        assert!(error.text.contains("City T1"));

        // The stop flag halted the run after that day: day 2 never ran.
        assert_eq!(store.game_results().count(), 0);
    }

    /// A heavy underdog forced to win: the result must honor the scripted
    /// winner and carry a trial count within the budget.
    #[test]
    fn test_forced_underdog_winner() {
        let mut store = league(2, 8);
        store.attrs_mut().god_mode = true;
        // Make the away team a big underdog.
        for pid in store.pids_by_tid(1) {
            store.player_mut(pid).unwrap().ratings.ovr = 48;
        }
        let gid = store.add_scheduled_game(1, 0, 1);
        store.scheduled_game_mut(gid).unwrap().force_win = Some(ForcedOutcome::Team(1));

        let (_, lock) = advance(&mut store, AdvanceOptions::days(1));

        let result = store.game_result(gid).unwrap();
        assert_eq!(result.winner_tid(), Some(1));
        let trials = result.force_win_trials.unwrap();
        assert!((1..=2000).contains(&trials));
        assert!(!lock.stop_requested());
    }

    #[test]
    fn test_live_single_game_trace_surfaces() {
        let mut store = league(4, 8);
        let gid = store.add_scheduled_game(1, 0, 1);
        store.add_scheduled_game(1, 2, 3);

        let (sink, _) = advance(&mut store, AdvanceOptions::live_game(gid));

        // The other game of the day is untouched.
        assert_eq!(store.schedule_len(), 1);
        assert!(sink.hints.iter().any(|h| matches!(h, UiHint::LiveGameInProgress)));
        let live = sink.hints.iter().find_map(|h| match h {
            UiHint::RealtimeUpdate { live: Some(live), .. } => Some(live),
            _ => None,
        });
        assert_eq!(live.expect("live trace").gid, gid);
    }
}
