//! Derived stat aggregates: team overall caches, league leaders, and
//! advanced per-player figures recomputed after each day.

use crate::db::LeagueStore;
use crate::error::Result;

/// Players counted toward a team's displayed overall rating.
const TOP_N: usize = 8;

/// Cached league-leader aggregate, invalidated whenever results land.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonLeaders {
    /// (pid, per-game average) for each category.
    pub pts: Option<(u32, f32)>,
    pub reb: Option<(u32, f32)>,
    pub ast: Option<(u32, f32)>,
}

/// Return the cached leaders, computing them on a cache miss.
pub fn season_leaders(store: &mut LeagueStore) -> SeasonLeaders {
    if let Some(cached) = store.season_leaders_cache() {
        return cached.clone();
    }

    let mut leaders = SeasonLeaders::default();
    for player in store.players().filter(|p| p.stats.gp > 0) {
        let gp = player.stats.gp as f32;
        let categories = [
            (&mut leaders.pts, player.stats.pts as f32 / gp),
            (&mut leaders.reb, player.stats.reb as f32 / gp),
            (&mut leaders.ast, player.stats.ast as f32 / gp),
        ];
        for (slot, avg) in categories {
            if slot.map_or(true, |(_, best)| avg > best) {
                *slot = Some((player.pid, avg));
            }
        }
    }

    store.set_season_leaders_cache(leaders.clone());
    leaders
}

/// Recompute each team's displayed overall rating from its healthy rotation.
/// Injured players are excluded, so the figure moves with the injury list.
pub fn recompute_team_ovrs(store: &mut LeagueStore) -> Result<()> {
    for tid in store.active_tids() {
        let mut ratings: Vec<u8> = store
            .pids_by_tid(tid)
            .into_iter()
            .filter_map(|pid| {
                let p = store.player(pid).ok()?;
                p.can_play().then_some(p.ratings.ovr)
            })
            .collect();
        ratings.sort_unstable_by(|a, b| b.cmp(a));

        let top: Vec<u8> = ratings.into_iter().take(TOP_N).collect();
        let ovr = if top.is_empty() {
            0.0
        } else {
            top.iter().map(|&r| r as f32).sum::<f32>() / top.len() as f32
        };
        store.set_team_ovr(tid, ovr);
    }

    Ok(())
}

/// Refresh derived per-player season figures.
pub fn advanced_stats(store: &mut LeagueStore) -> Result<()> {
    let pids: Vec<u32> = store.players().map(|p| p.pid).collect();
    for pid in pids {
        let player = store.player_mut(pid)?;
        if player.stats.gp > 0 {
            player.stats.efficiency = (player.stats.pts + player.stats.reb + player.stats.ast)
                as f32
                / player.stats.gp as f32;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameAttributes, Injury, Player, Team};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn store_with_players(ovrs: &[u8]) -> LeagueStore {
        let mut store = LeagueStore::new(GameAttributes::default());
        store.put_team(Team::new(0, "City", "Squad"));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for &ovr in ovrs {
            let pid = store.next_pid();
            let mut p = Player::gen_random_free_agent(pid, 1, 750, &mut rng);
            p.tid = 0;
            p.ratings.ovr = ovr;
            store.put_player(p);
        }
        store
    }

    #[test]
    fn test_team_ovr_ignores_injured_players() {
        let mut store = store_with_players(&[90, 50, 50]);
        store.player_mut(1).unwrap().injury =
            Injury { kind: "Torn ACL".to_string(), games_remaining: 50, score: 90 };

        recompute_team_ovrs(&mut store).unwrap();

        assert_eq!(store.team_ovr(0), Some(50.0));
    }

    #[test]
    fn test_leaders_cache_roundtrip() {
        let mut store = store_with_players(&[60, 60]);
        store.player_mut(1).unwrap().stats.gp = 2;
        store.player_mut(1).unwrap().stats.pts = 50;
        store.player_mut(2).unwrap().stats.gp = 2;
        store.player_mut(2).unwrap().stats.pts = 30;

        let leaders = season_leaders(&mut store);
        assert_eq!(leaders.pts, Some((1, 25.0)));

        // Cache hit returns the same aggregate.
        assert_eq!(season_leaders(&mut store).pts, Some((1, 25.0)));

        // After invalidation and new stats, leaders change.
        store.player_mut(2).unwrap().stats.pts = 80;
        store.invalidate_season_leaders();
        assert_eq!(season_leaders(&mut store).pts, Some((2, 40.0)));
    }

    #[test]
    fn test_advanced_stats_skip_players_without_games() {
        let mut store = store_with_players(&[60]);
        store.player_mut(1).unwrap().stats = Default::default();

        advanced_stats(&mut store).unwrap();
        assert_eq!(store.player(1).unwrap().stats.efficiency, 0.0);
    }
}
