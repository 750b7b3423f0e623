//! Clinched-playoff-berth recomputation.

use std::collections::BTreeMap;

use crate::db::LeagueStore;
use crate::error::Result;

/// Recompute which teams are mathematically assured of a playoff berth.
///
/// A team clinches when fewer than `num_playoff_teams` rivals could still
/// finish with at least its current standings points, assuming the team
/// itself loses out and every rival wins out. Ties in the final standings
/// count against the team, since tiebreakers are not modeled here.
pub fn update_clinched_playoffs(store: &mut LeagueStore) -> Result<()> {
    let num_spots = store.attrs().num_playoff_teams();

    let mut remaining: BTreeMap<i32, u32> = BTreeMap::new();
    for game in store.schedule_ordered() {
        if game.home_tid >= 0 {
            *remaining.entry(game.home_tid).or_default() += 1;
        }
        if game.away_tid >= 0 {
            *remaining.entry(game.away_tid).or_default() += 1;
        }
    }

    let standings: Vec<(i32, u32)> = store
        .teams()
        .filter(|t| !t.disabled && t.tid >= 0)
        .map(|t| (t.tid, t.record.standing_points()))
        .collect();

    for &(tid, points) in &standings {
        let rivals_still_alive = standings
            .iter()
            .filter(|&&(other, other_points)| {
                if other == tid {
                    return false;
                }
                let max_points =
                    other_points + 2 * remaining.get(&other).copied().unwrap_or(0);
                max_points >= points
            })
            .count();

        let clinched = rivals_still_alive < num_spots;
        store.team_mut(tid)?.record.clinched_playoffs = clinched;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameAttributes, Team};

    fn store_with_records(records: &[(i32, u32, u32)], playoff_teams_rounds: usize) -> LeagueStore {
        let mut attrs = GameAttributes::default();
        attrs.num_games_playoff_series = vec![7; playoff_teams_rounds];
        let mut store = LeagueStore::new(attrs);
        for &(tid, won, lost) in records {
            let mut team = Team::new(tid, "City", &format!("T{tid}"));
            team.record.won = won;
            team.record.lost = lost;
            store.put_team(team);
        }
        store
    }

    #[test]
    fn test_runaway_leader_clinches() {
        // 2-team bracket (1 round); the leader is 10 games up with 2 left.
        let mut store =
            store_with_records(&[(0, 40, 10), (1, 30, 20), (2, 10, 40), (3, 8, 42)], 1);
        store.add_scheduled_game(50, 0, 1);
        store.add_scheduled_game(50, 2, 3);

        update_clinched_playoffs(&mut store).unwrap();

        assert!(store.team(0).unwrap().record.clinched_playoffs);
        assert!(!store.team(2).unwrap().record.clinched_playoffs);
    }

    #[test]
    fn test_no_clinch_while_catchable() {
        let mut store = store_with_records(&[(0, 26, 24), (1, 25, 25), (2, 24, 26)], 1);
        // Both rivals have enough games left to catch the leader.
        for _ in 0..4 {
            store.add_scheduled_game(60, 1, 2);
        }

        update_clinched_playoffs(&mut store).unwrap();

        assert!(!store.team(0).unwrap().record.clinched_playoffs);
    }
}
