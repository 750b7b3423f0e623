//! AI-vs-AI trade evaluation, run once per completed regular-season day.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::db::LeagueStore;
use crate::error::Result;
use crate::notify::{LogEvent, NotificationSink};

/// Chance any trade talk happens on a given day.
const TRADE_TALK_CHANCE: f64 = 0.1;

/// Largest acceptable valuation gap for a one-for-one swap.
const MAX_VALUE_GAP: f32 = 3.0;

/// Games before a just-traded player can move again.
pub const TRADE_COOLDOWN_GAMES: u16 = 15;

/// Let two AI front offices look for a mutually acceptable one-for-one swap.
/// Returns whether a trade happened.
pub fn between_ai_teams(
    store: &mut LeagueStore,
    sink: &mut dyn NotificationSink,
    rng: &mut ChaCha8Rng,
) -> Result<bool> {
    if rng.gen::<f64>() >= TRADE_TALK_CHANCE {
        return Ok(false);
    }

    let user_tid = store.attrs().user_tid;
    let spectator = store.attrs().spectator;
    let tids: Vec<i32> = store
        .active_tids()
        .into_iter()
        .filter(|&tid| tid != user_tid || spectator)
        .collect();
    if tids.len() < 2 {
        return Ok(false);
    }

    let tid_a = tids[rng.gen_range(0..tids.len())];
    let tid_b = loop {
        let candidate = tids[rng.gen_range(0..tids.len())];
        if candidate != tid_a {
            break candidate;
        }
    };

    let tradable = |store: &LeagueStore, tid: i32| -> Vec<(u32, f32)> {
        store
            .pids_by_tid(tid)
            .into_iter()
            .filter_map(|pid| {
                let p = store.player(pid).ok()?;
                matches!(p.games_until_tradable, None | Some(0)).then_some((pid, p.value))
            })
            .collect()
    };

    let from_a = tradable(store, tid_a);
    let from_b = tradable(store, tid_b);

    let mut best: Option<(u32, u32, f32)> = None;
    for &(pid_a, value_a) in &from_a {
        for &(pid_b, value_b) in &from_b {
            let gap = (value_a - value_b).abs();
            if gap <= MAX_VALUE_GAP && best.map_or(true, |(_, _, b)| gap < b) {
                best = Some((pid_a, pid_b, gap));
            }
        }
    }

    let Some((pid_a, pid_b, _)) = best else {
        return Ok(false);
    };

    {
        let player = store.player_mut(pid_a)?;
        player.tid = tid_b;
        player.games_until_tradable = Some(TRADE_COOLDOWN_GAMES);
    }
    {
        let player = store.player_mut(pid_b)?;
        player.tid = tid_a;
        player.games_until_tradable = Some(TRADE_COOLDOWN_GAMES);
    }

    let name_a = store.player(pid_a)?.name.clone();
    let name_b = store.player(pid_b)?.name.clone();
    let team_a = store.team(tid_a)?.full_name();
    let team_b = store.team(tid_b)?.full_name();

    let mut event = LogEvent::info(format!(
        "The {} traded {} to the {} for {}.",
        team_a, name_a, team_b, name_b
    ));
    event.show_notification = false;
    event.tids = vec![tid_a, tid_b];
    event.pids = vec![pid_a, pid_b];
    sink.log_event(event);

    log::info!("AI trade: {} ({}) <-> {} ({})", pid_a, tid_a, pid_b, tid_b);
    Ok(true)
}
