//! Free agency housekeeping run after each completed day.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::db::LeagueStore;
use crate::error::Result;

/// Per-day decay of a free agent's asking price, in thousands.
const DEMAND_DECAY: u32 = 50;

/// Chance an AI team with an open roster spot shops the market on a given
/// day when it is not forced to sign.
const DISCRETIONARY_SIGN_CHANCE: f64 = 0.1;

/// Every unsigned free agent lowers their asking price a little each day,
/// never below the league minimum.
pub fn decrease_demands(store: &mut LeagueStore) -> Result<()> {
    let min_contract = store.attrs().min_contract;

    for pid in store.free_agent_pids() {
        let player = store.player_mut(pid)?;
        player.contract.amount =
            player.contract.amount.saturating_sub(DEMAND_DECAY).max(min_contract);
    }

    Ok(())
}

/// AI teams sign free agents: always when under the roster minimum, and
/// occasionally when a free agent clearly beats their worst player. Runs
/// worst-record teams first so the market favors the needy. Injury status is
/// current because this runs after the day's injury countdowns.
pub fn auto_sign(store: &mut LeagueStore, rng: &mut ChaCha8Rng) -> Result<()> {
    let min_roster_size = store.attrs().min_roster_size;
    let max_roster_size = store.attrs().max_roster_size;
    let user_tid = store.attrs().user_tid;
    let spectator = store.attrs().spectator;

    let mut order: Vec<(u32, i32)> = store
        .teams()
        .filter(|t| !t.disabled && (t.tid != user_tid || spectator))
        .map(|t| (t.record.standing_points(), t.tid))
        .collect();
    order.sort();

    for (_, tid) in order {
        loop {
            let roster = store.pids_by_tid(tid);
            if roster.len() >= max_roster_size {
                break;
            }

            let best_fa = {
                let mut fas: Vec<(u32, f32)> = store
                    .free_agent_pids()
                    .into_iter()
                    .map(|pid| store.player(pid).map(|p| (pid, p.value)))
                    .collect::<Result<_>>()?;
                fas.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                fas.first().copied()
            };
            let Some((fa_pid, fa_value)) = best_fa else {
                break; // Market is empty.
            };

            let must_sign = roster.len() < min_roster_size;
            if !must_sign {
                let worst_value = roster
                    .iter()
                    .filter_map(|&pid| store.player(pid).ok())
                    .map(|p| p.value)
                    .fold(f32::INFINITY, f32::min);
                let wants_to =
                    rng.gen::<f64>() < DISCRETIONARY_SIGN_CHANCE && fa_value > worst_value + 5.0;
                if !wants_to {
                    break;
                }
            }

            let season = store.attrs().season;
            let player = store.player_mut(fa_pid)?;
            player.tid = tid;
            player.contract.exp = season + 1;
            log::debug!("Team {} signed free agent {}", tid, fa_pid);
        }
    }

    Ok(())
}

/// Reset contract demands for players just released to free agency.
pub fn normalize_released(store: &mut LeagueStore, pids: &[u32]) -> Result<()> {
    let min_contract = store.attrs().min_contract;
    let season = store.attrs().season;

    for &pid in pids {
        let player = store.player_mut(pid)?;
        player.contract.amount = player.contract.amount.max(min_contract);
        player.contract.exp = season + 1;
    }

    Ok(())
}
