//! Roster size legality and AI roster auto-fixing.
//!
//! If an AI team is over the maximum roster size, its worst players are
//! released; if under the minimum, minimum-contract free agents (generated
//! when none are left) are signed until it is legal. If the user's team
//! breaks a limit, the run is refused with a descriptive message instead.

use std::collections::VecDeque;

use rand_chacha::ChaCha8Rng;

use crate::db::LeagueStore;
use crate::error::Result;
use crate::free_agents;
use crate::models::{Player, FREE_AGENT_TID};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterScope {
    /// Only the human-controlled team; violations become errors.
    User,
    /// Every AI team; violations are fixed automatically.
    Other,
}

/// Check roster size limits for the given scope.
///
/// Returns `Ok(Some(message))` when the user's team is illegal; the caller
/// aborts the run and surfaces the message.
pub fn check_roster_sizes(
    store: &mut LeagueStore,
    rng: &mut ChaCha8Rng,
    scope: RosterScope,
) -> Result<Option<String>> {
    let max_roster_size = store.attrs().max_roster_size;
    let min_roster_size = store.attrs().min_roster_size;
    let min_contract = store.attrs().min_contract;
    let season = store.attrs().season;
    let user_tid = store.attrs().user_tid;
    let spectator = store.attrs().spectator;

    // Free agents on minimum contracts, best first, used to bump AI teams up
    // to the minimum roster size.
    let mut min_free_agents: VecDeque<u32> = {
        let mut pids: Vec<(u32, f32)> = store
            .free_agent_pids()
            .into_iter()
            .filter_map(|pid| {
                let p = store.player(pid).ok()?;
                (p.contract.amount <= min_contract).then_some((pid, p.value))
            })
            .collect();
        pids.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pids.into_iter().map(|(pid, _)| pid).collect()
    };

    let mut released_pids: Vec<u32> = Vec::new();

    for tid in store.active_tids() {
        let user_team_and_active = tid == user_tid && !spectator;
        let in_scope = match scope {
            RosterScope::User => user_team_and_active,
            RosterScope::Other => !user_team_and_active,
        };
        if !in_scope {
            continue;
        }

        let roster = store.pids_by_tid(tid);
        let mut num_on_roster = roster.len();

        if num_on_roster > max_roster_size {
            if user_team_and_active {
                return Ok(Some(format!(
                    "Your team has more than the maximum number of players ({}). \
                     You must remove players from your roster before continuing.",
                    max_roster_size
                )));
            }
            released_pids.extend(drop_players(
                store,
                &roster,
                num_on_roster - max_roster_size,
            )?);
        } else if num_on_roster < min_roster_size {
            if user_team_and_active {
                return Ok(Some(format!(
                    "Your team has fewer than the minimum number of players ({}). \
                     You must add players through free agency or trades before \
                     continuing. Reminder: you can always sign free agents to \
                     minimum contracts, even if you're over the cap!",
                    min_roster_size
                )));
            }

            // Auto-add players
            while num_on_roster < min_roster_size {
                let pid = match min_free_agents.pop_front() {
                    Some(pid) => pid,
                    None => {
                        let pid = store.next_pid();
                        let p = Player::gen_random_free_agent(pid, season, min_contract, rng);
                        store.put_player(p);
                        pid
                    }
                };
                let player = store.player_mut(pid)?;
                player.tid = tid;
                player.contract.amount = min_contract;
                num_on_roster += 1;
                log::debug!("Auto-signed player {} to team {}", pid, tid);
            }
        }

        // Auto sort AI rosters before every game; the user's only by request.
        let keep_sorted = store.team(tid)?.keep_roster_sorted;
        if !user_team_and_active || keep_sorted {
            roster_auto_sort(store, tid)?;
        }
    }

    if !released_pids.is_empty() {
        free_agents::normalize_released(store, &released_pids)?;
    }

    Ok(None)
}

/// Release the lowest-value players from a roster until `num_to_drop` are
/// gone. Returns the released pids.
fn drop_players(store: &mut LeagueStore, roster: &[u32], num_to_drop: usize) -> Result<Vec<u32>> {
    let mut by_value: Vec<(u32, f32)> = roster
        .iter()
        .map(|&pid| store.player(pid).map(|p| (pid, p.value)))
        .collect::<Result<_>>()?;
    by_value.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut released = Vec::with_capacity(num_to_drop);
    for (pid, _) in by_value.into_iter().take(num_to_drop) {
        let player = store.player_mut(pid)?;
        player.tid = FREE_AGENT_TID;
        released.push(pid);
        log::debug!("Released player {} to free agency", pid);
    }

    Ok(released)
}

/// Reset a team's rotation order to best-rating-first.
pub fn roster_auto_sort(store: &mut LeagueStore, tid: i32) -> Result<()> {
    let mut roster: Vec<(u32, u8)> = store
        .pids_by_tid(tid)
        .into_iter()
        .map(|pid| store.player(pid).map(|p| (pid, p.ratings.ovr)))
        .collect::<Result<_>>()?;
    roster.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    store.team_mut(tid)?.depth = roster.into_iter().map(|(pid, _)| pid).collect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameAttributes, Team};
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn store_with_roster(tid: i32, count: usize) -> LeagueStore {
        let mut attrs = GameAttributes::default();
        attrs.max_roster_size = 15;
        attrs.min_roster_size = 13;
        attrs.user_tid = 0;
        let mut store = LeagueStore::new(attrs);
        store.put_team(Team::new(tid, "City", "Squad"));

        let mut r = rng();
        for _ in 0..count {
            let pid = store.next_pid();
            let mut p = Player::gen_random_free_agent(pid, 1, 750, &mut r);
            p.tid = tid;
            p.value = pid as f32; // Higher pid, higher value.
            store.put_player(p);
        }
        store
    }

    #[test]
    fn test_user_over_max_is_an_error() {
        let mut store = store_with_roster(0, 17);
        let err = check_roster_sizes(&mut store, &mut rng(), RosterScope::User).unwrap();
        assert!(err.unwrap().contains("maximum number of players"));
    }

    #[test]
    fn test_user_under_min_is_an_error() {
        let mut store = store_with_roster(0, 5);
        let err = check_roster_sizes(&mut store, &mut rng(), RosterScope::User).unwrap();
        assert!(err.unwrap().contains("minimum number of players"));
    }

    #[test]
    fn test_ai_over_max_drops_worst_players() {
        let mut store = store_with_roster(3, 17);
        let err = check_roster_sizes(&mut store, &mut rng(), RosterScope::Other).unwrap();
        assert!(err.is_none());
        assert_eq!(store.pids_by_tid(3).len(), 15);

        // The two lowest-value players (lowest pids here) were released.
        let released = store.free_agent_pids();
        assert_eq!(released, vec![1, 2]);
    }

    #[test]
    fn test_ai_under_min_signs_generated_free_agents() {
        let mut store = store_with_roster(3, 10);
        let err = check_roster_sizes(&mut store, &mut rng(), RosterScope::Other).unwrap();
        assert!(err.is_none());
        assert_eq!(store.pids_by_tid(3).len(), 13);
    }

    #[test]
    fn test_auto_sort_orders_depth_by_rating() {
        let mut store = store_with_roster(3, 5);
        roster_auto_sort(&mut store, 3).unwrap();

        let depth = &store.team(3).unwrap().depth;
        let ovrs: Vec<u8> =
            depth.iter().map(|&pid| store.player(pid).unwrap().ratings.ovr).collect();
        assert!(ovrs.windows(2).all(|w| w[0] >= w[1]));
    }
}
