//! Day-result processor.
//!
//! Persists a day's results and applies every end-of-day side effect in the
//! order later steps depend on: stats and injuries land before the countdown
//! pass, countdowns before free agency (auto-sign reads current injury
//! status), and the playoff calendar advances last.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::db::LeagueStore;
use crate::error::Result;
use crate::free_agents;
use crate::models::{GameResult, Injury, Phase};
use crate::notify::{EventKind, LiveGame, LogEvent, NotificationSink, UiHint, UpdateTag};
use crate::season::{clinch, playoffs};
use crate::sim::lock::RunLock;
use crate::stats;
use crate::trade;

/// Daily fatigue recovery for sports carrying the fatigue attribute.
pub const FATIGUE_DAILY_RECOVERY: u8 = 15;

/// What a processed day reports back to the controller.
#[derive(Debug)]
pub struct DayReport {
    pub update_tags: Vec<UpdateTag>,
    pub playoffs_over: bool,
    pub live: Option<LiveGame>,
}

struct PlayerStatsOutcome {
    injury_texts: Vec<String>,
    pids_injured_one_game_or_less: HashSet<u32>,
    stop_play: bool,
}

/// Apply per-player stat deltas and new injuries.
fn write_player_stats(
    store: &mut LeagueStore,
    results: &[GameResult],
) -> Result<PlayerStatsOutcome> {
    let user_tid = store.attrs().user_tid;
    let stop_on_injury = store.attrs().stop_on_injury;

    let mut injury_texts = Vec::new();
    let mut pids_injured_one_game_or_less = HashSet::new();
    let mut stop_play = false;

    for result in results {
        for line in &result.players {
            let team_name = if line.tid >= 0 {
                store.team(line.tid)?.full_name()
            } else {
                "Exhibition".to_string()
            };

            let player = store.player_mut(line.pid)?;
            player.stats.gp += 1;
            player.stats.min += line.stat.min as u32;
            player.stats.pts += line.stat.pts as u32;
            player.stats.reb += line.stat.reb as u32;
            player.stats.ast += line.stat.ast as u32;

            if let Some(injury) = &line.injury_new {
                player.injury = injury.clone();

                if injury.games_remaining <= 1 {
                    pids_injured_one_game_or_less.insert(line.pid);
                }

                injury_texts.push(format!(
                    "{} {} ({}) was injured: {}, out {} {}",
                    player.pos.abbrev(),
                    player.name,
                    team_name,
                    injury.kind,
                    injury.games_remaining,
                    if injury.games_remaining == 1 { "game" } else { "games" },
                ));

                if stop_on_injury && line.tid == user_tid && injury.games_remaining > 0 {
                    stop_play = true;
                }
            }
        }
    }

    Ok(PlayerStatsOutcome { injury_texts, pids_injured_one_game_or_less, stop_play })
}

/// Update team records and persist each result; remove resolved games from
/// the schedule. Returns the gids removed, which by construction equal the
/// day's result set.
fn write_team_stats(store: &mut LeagueStore, results: &[GameResult]) -> Result<Vec<u32>> {
    let phase = store.attrs().phase;
    let mut gids_finished = Vec::with_capacity(results.len());

    for result in results {
        let winner = result.winner_tid();
        let [home, away] = &result.teams;
        let count_in_standings = phase < Phase::Playoffs && home.tid >= 0 && away.tid >= 0;

        if count_in_standings {
            for (line, other) in [(home, away), (away, home)] {
                let record = &mut store.team_mut(line.tid)?.record;
                record.pts_for += line.stat.pts as u64;
                record.pts_against += other.stat.pts as u64;
                match winner {
                    Some(tid) if tid == line.tid => record.won += 1,
                    Some(_) => record.lost += 1,
                    None => record.tied += 1,
                }
            }
        }

        gids_finished.push(result.gid);
        store.put_game_result(result.clone());
    }

    // Delete finished games from schedule.
    for &gid in &gids_finished {
        store.delete_scheduled_game(gid)?;
    }

    Ok(gids_finished)
}

/// End-of-day per-player pass: injury countdowns, fatigue decay, trade
/// eligibility. Each player's update touches only its own fields, so order
/// across players does not matter; it runs once per player per day.
fn countdown_pass(
    store: &mut LeagueStore,
    sink: &mut dyn NotificationSink,
    pids_injured_one_game_or_less: &HashSet<u32>,
) -> Result<()> {
    let user_tid = store.attrs().user_tid;
    let mut healed_texts = Vec::new();

    for pid in store.rostered_pids() {
        let player = store.player_mut(pid)?;

        if player.injury.games_remaining > 0 {
            player.injury.games_remaining -= 1;
        }

        if let Some(fatigue) = player.p_fatigue {
            if fatigue > 0 {
                player.p_fatigue = Some(fatigue.saturating_sub(FATIGUE_DAILY_RECOVERY).min(100));
            }
        }

        // Is it already over?
        if !player.injury.is_healthy() && player.injury.games_remaining == 0 {
            let score = player.injury.score;
            player.injury = Injury::healthy();

            let healed_text = format!("{} {}", player.pos.abbrev(), player.name);
            let tid = player.tid;

            if tid == user_tid && !pids_injured_one_game_or_less.contains(&pid) {
                healed_texts.push(healed_text.clone());
            }

            let mut event =
                LogEvent::info(format!("{} has recovered from injury.", healed_text));
            event.kind = EventKind::Healed;
            event.show_notification = false;
            event.pids = vec![pid];
            event.tids = vec![tid];
            event.score = Some(score);
            sink.log_event(event);
        }

        // Also check for the trade-eligibility countdown.
        let player = store.player_mut(pid)?;
        match player.games_until_tradable {
            None => player.games_until_tradable = Some(0), // Initialize for old leagues
            Some(n) if n > 0 => player.games_until_tradable = Some(n - 1),
            _ => {}
        }
    }

    if !healed_texts.is_empty() {
        let mut event = LogEvent::info(healed_texts.join("; "));
        event.kind = EventKind::HealedList;
        sink.log_event(event);
    }

    Ok(())
}

/// Remove one random player from the league.
fn tragic_event(
    store: &mut LeagueStore,
    sink: &mut dyn NotificationSink,
    rng: &mut ChaCha8Rng,
) -> Result<Option<u32>> {
    let pids = store.rostered_pids();
    if pids.is_empty() {
        return Ok(None);
    }

    let pid = pids[rng.gen_range(0..pids.len())];
    let player = store.delete_player(pid)?;

    if let Ok(team) = store.team_mut(player.tid) {
        team.depth.retain(|&d| d != pid);
    }

    let mut event = LogEvent::info(format!(
        "{} has died a tragic death at the peak of their career.",
        player.name
    ));
    event.kind = EventKind::Tragedy;
    event.persistent = true;
    event.pids = vec![pid];
    event.tids = vec![player.tid];
    sink.log_event(event);

    log::info!("Tragic event removed player {} from the league", pid);
    Ok(Some(pid))
}

pub fn process_day_results(
    store: &mut LeagueStore,
    lock: &RunLock,
    sink: &mut dyn NotificationSink,
    rng: &mut ChaCha8Rng,
    results: Vec<GameResult>,
    day_over: bool,
    single_gid: Option<u32>,
    want_trace: bool,
) -> Result<DayReport> {
    // Before any stats land, so the scoreboard cannot update with the
    // result of a live game still being presented.
    if single_gid.is_some() && want_trace {
        sink.ui_hint(UiHint::LiveGameInProgress);
    }

    // Before team stats, so injuries are set correctly.
    let player_outcome = write_player_stats(store, &results)?;
    if player_outcome.stop_play {
        lock.request_stop();
    }

    write_team_stats(store, &results)?;

    // Invalidate leaders cache, if it exists.
    store.invalidate_season_leaders();

    if store.attrs().phase == Phase::Playoffs {
        playoffs::update_series(store, &results)?;
    } else if store.schedule_len() > 0 {
        // Only recompute clinching while games remain. With an empty
        // schedule it would be inaccurate (no tiebreakers here) and
        // redundant: the phase change recomputes everything.
        clinch::update_clinched_playoffs(store)?;
    }

    if !player_outcome.injury_texts.is_empty() {
        let mut event = LogEvent::info(player_outcome.injury_texts.join("; "));
        event.kind = EventKind::InjuredList;
        event.persistent = player_outcome.stop_play;
        sink.log_event(event);
    }

    let mut update_tags = vec![UpdateTag::GameSim];

    if day_over {
        countdown_pass(store, sink, &player_outcome.pids_injured_one_game_or_less)?;

        // Tragic events only happen during the regular season.
        let phase = store.attrs().phase;
        if phase != Phase::Playoffs && rng.gen::<f64>() < store.attrs().tragic_death_rate {
            if tragic_event(store, sink, rng)?.is_some() {
                if store.attrs().stop_on_injury {
                    lock.request_stop();
                }
                update_tags.push(UpdateTag::PlayerMovement);
            }
        }

        // After injuries, so auto-sign knows who is available tomorrow.
        if phase.is_regular_season_adjacent() {
            free_agents::decrease_demands(store)?;
            free_agents::auto_sign(store, rng)?;
        }
        if phase == Phase::RegularSeason && trade::between_ai_teams(store, sink, rng)? {
            update_tags.push(UpdateTag::PlayerMovement);
        }
    }

    // Refresh displayed overalls (they track injuries) and advanced stats.
    stats::recompute_team_ovrs(store)?;
    stats::advanced_stats(store)?;

    let playoffs_over = store.attrs().phase == Phase::Playoffs
        && playoffs::new_schedule_playoffs_day(store, sink)?;

    // Surface the live game's trace, if one was requested.
    let mut live = None;
    if single_gid.is_some() && want_trace {
        for result in &results {
            if let Some(play_by_play) = &result.play_by_play {
                live = Some(LiveGame { gid: result.gid, play_by_play: play_by_play.clone() });
                break;
            }
        }
    }

    sink.ui_hint(UiHint::RealtimeUpdate { tags: update_tags.clone(), live: live.clone() });

    Ok(DayReport { update_tags, playoffs_over, live })
}
