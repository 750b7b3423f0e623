//! Season-level schedule operations.

pub mod clinch;
pub mod playoffs;

use crate::db::LeagueStore;
use crate::error::Result;
use crate::models::{ScheduledGame, TRADE_DEADLINE_TID};

/// The earliest remaining day's games, in gid order.
pub fn games_for_next_day(store: &LeagueStore) -> Vec<ScheduledGame> {
    let ordered = store.schedule_ordered();
    let Some(first_day) = ordered.first().map(|g| g.day) else {
        return Vec::new();
    };
    ordered.into_iter().take_while(|g| g.day == first_day).collect()
}

/// Whether the next scheduled game is the all-star exhibition.
pub fn next_game_is_all_star(schedule: &[ScheduledGame]) -> bool {
    schedule.first().map_or(false, |g| g.is_all_star())
}

/// Generate a double round robin for all active teams, with the
/// trade-deadline placeholder on its own day between the two halves.
pub fn generate_regular_schedule(store: &mut LeagueStore) -> Result<()> {
    let tids = store.active_tids();
    let mut slots: Vec<Option<i32>> = tids.into_iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None); // bye
    }
    let m = slots.len();
    if m < 2 {
        return Ok(());
    }
    let rounds = m - 1;

    let mut day: u16 = 1;
    for half in 0..2 {
        let mut arr = slots.clone();
        for _ in 0..rounds {
            for i in 0..m / 2 {
                if let (Some(a), Some(b)) = (arr[i], arr[m - 1 - i]) {
                    let (home, away) = if half == 0 { (a, b) } else { (b, a) };
                    store.add_scheduled_game(day, home, away);
                }
            }
            day += 1;
            // Circle method: first slot fixed, the rest rotate.
            arr[1..].rotate_right(1);
        }

        if half == 0 {
            store.add_scheduled_game(day, TRADE_DEADLINE_TID, TRADE_DEADLINE_TID);
            day += 1;
        }
    }

    log::info!("Generated regular season schedule through day {}", day - 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameAttributes, Team};

    fn store_with_teams(n: i32) -> LeagueStore {
        let mut store = LeagueStore::new(GameAttributes::default());
        for tid in 0..n {
            store.put_team(Team::new(tid, "City", &format!("Team {tid}")));
        }
        store
    }

    #[test]
    fn test_double_round_robin_game_count() {
        let mut store = store_with_teams(4);
        generate_regular_schedule(&mut store).unwrap();

        // 4 teams: 2 games/day * 3 days per half * 2 halves, plus the
        // deadline placeholder.
        assert_eq!(store.schedule_len(), 13);

        let deadline: Vec<_> =
            store.schedule_ordered().into_iter().filter(|g| g.is_trade_deadline()).collect();
        assert_eq!(deadline.len(), 1);
    }

    #[test]
    fn test_each_pair_meets_home_and_away() {
        let mut store = store_with_teams(4);
        generate_regular_schedule(&mut store).unwrap();

        let games = store.schedule_ordered();
        for a in 0..4 {
            for b in 0..4 {
                if a == b {
                    continue;
                }
                let count =
                    games.iter().filter(|g| g.home_tid == a && g.away_tid == b).count();
                assert_eq!(count, 1, "expected exactly one {a} home vs {b}");
            }
        }
    }

    #[test]
    fn test_games_for_next_day_only_earliest_day() {
        let mut store = store_with_teams(4);
        store.add_scheduled_game(2, 0, 1);
        store.add_scheduled_game(1, 2, 3);
        store.add_scheduled_game(1, 0, 2);

        let games = games_for_next_day(&store);
        assert_eq!(games.len(), 2);
        assert!(games.iter().all(|g| g.day == 1));
    }

    #[test]
    fn test_odd_team_count_gets_byes() {
        let mut store = store_with_teams(5);
        generate_regular_schedule(&mut store).unwrap();

        // Every team plays each other team twice.
        for tid in 0..5 {
            let count = store
                .schedule_ordered()
                .iter()
                .filter(|g| g.home_tid == tid || g.away_tid == tid)
                .count();
            assert_eq!(count, 8);
        }
    }
}
