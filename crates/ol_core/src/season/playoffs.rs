//! Playoff bracket state and the next-playoff-day scheduler.

use serde::{Deserialize, Serialize};

use crate::db::LeagueStore;
use crate::error::{LeagueError, Result};
use crate::models::GameResult;
use crate::notify::{LogEvent, NotificationSink};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesTeam {
    pub tid: i32,
    /// 1-based bracket seed; lower is better.
    pub seed: u8,
    pub won: u8,
}

/// One playoff series. `home` is the better seed and holds home advantage
/// for the series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Series {
    pub home: SeriesTeam,
    pub away: SeriesTeam,
}

impl Series {
    pub fn involves(&self, tid_a: i32, tid_b: i32) -> bool {
        let (h, a) = (self.home.tid, self.away.tid);
        (h == tid_a && a == tid_b) || (h == tid_b && a == tid_a)
    }

    pub fn winner(&self, needed: u8) -> Option<&SeriesTeam> {
        if self.home.won >= needed {
            Some(&self.home)
        } else if self.away.won >= needed {
            Some(&self.away)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayoffsState {
    pub season: u16,
    pub current_round: usize,

    /// Series per round, created as rounds begin. `rounds[0]` is the first
    /// round; the finals round holds a single series.
    pub rounds: Vec<Vec<Series>>,

    /// Wins needed to take each round, fixed at bracket creation.
    pub needed: Vec<u8>,

    /// Day number for the next scheduled playoff games.
    pub next_day: u16,

    #[serde(default)]
    pub champion: Option<i32>,
}

impl PlayoffsState {
    pub fn finals_round(&self) -> usize {
        self.needed.len().saturating_sub(1)
    }

    /// Whether the one-game-finals home-advantage exception applies right
    /// now: a single-game format with the final round underway.
    pub fn in_single_game_finals(&self) -> bool {
        self.current_round == self.finals_round()
            && self.needed.last().copied() == Some(1)
    }
}

/// Seed the bracket from current standings. The bracket size is the largest
/// power of two that both the configuration and the active team count allow;
/// when rounds are cut, the later (shorter bracket) rounds keep their
/// configured series lengths.
pub fn init_playoffs(store: &LeagueStore) -> Result<PlayoffsState> {
    let attrs = store.attrs();

    let mut standings: Vec<(i32, u32, i64)> = store
        .teams()
        .filter(|t| !t.disabled && t.tid >= 0)
        .map(|t| {
            (
                t.tid,
                t.record.standing_points(),
                t.record.pts_for as i64 - t.record.pts_against as i64,
            )
        })
        .collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));

    let configured = attrs.playoff_rounds();
    let max_rounds_for_teams = if standings.len() < 2 {
        0
    } else {
        (usize::BITS - 1 - standings.len().leading_zeros()) as usize
    };
    let rounds = configured.min(max_rounds_for_teams);
    let num_teams = 1usize << rounds;

    let needed: Vec<u8> = attrs.num_games_playoff_series[configured - rounds..]
        .iter()
        .map(|&n| n / 2 + 1)
        .collect();

    let next_day = store.last_completed_day() + 1;

    if rounds == 0 {
        // Degenerate league; crown whoever is on top.
        return Ok(PlayoffsState {
            season: attrs.season,
            current_round: 0,
            rounds: Vec::new(),
            needed,
            next_day,
            champion: standings.first().map(|&(tid, _, _)| tid),
        });
    }

    let first_round = (0..num_teams / 2)
        .map(|i| Series {
            home: SeriesTeam { tid: standings[i].0, seed: (i + 1) as u8, won: 0 },
            away: SeriesTeam {
                tid: standings[num_teams - 1 - i].0,
                seed: (num_teams - i) as u8,
                won: 0,
            },
        })
        .collect();

    Ok(PlayoffsState {
        season: attrs.season,
        current_round: 0,
        rounds: vec![first_round],
        needed,
        next_day,
        champion: None,
    })
}

/// Apply a day's playoff results to the current round's series records.
pub fn update_series(store: &mut LeagueStore, results: &[GameResult]) -> Result<()> {
    let season = store.attrs().season;
    let Some(playoffs) = store.playoffs_mut() else {
        return Err(LeagueError::MissingPlayoffs(season));
    };

    let round = playoffs.current_round;
    for result in results {
        let Some(winner) = result.winner_tid() else {
            continue; // Playoff games cannot tie; tolerate anyway.
        };
        let (home_tid, away_tid) = (result.teams[0].tid, result.teams[1].tid);

        if let Some(series) = playoffs.rounds[round]
            .iter_mut()
            .find(|s| s.involves(home_tid, away_tid))
        {
            if series.home.tid == winner {
                series.home.won += 1;
            } else {
                series.away.won += 1;
            }
        } else {
            log::warn!(
                "playoff result gid {} does not match any series in round {}",
                result.gid,
                round
            );
        }
    }

    Ok(())
}

/// Advance the playoff calendar: finish the current round if every series is
/// decided, then schedule the next day of games for unfinished series.
///
/// Returns `true` when the finals have been decided and the playoffs are
/// over.
pub fn new_schedule_playoffs_day(
    store: &mut LeagueStore,
    sink: &mut dyn NotificationSink,
) -> Result<bool> {
    let season = store.attrs().season;
    let Some(mut playoffs) = store.playoffs().cloned() else {
        return Err(LeagueError::MissingPlayoffs(season));
    };

    if playoffs.champion.is_some() || playoffs.rounds.is_empty() {
        // Already decided (degenerate brackets are decided at creation).
        return Ok(true);
    }

    let needed = playoffs.needed[playoffs.current_round];
    let all_decided =
        playoffs.rounds[playoffs.current_round].iter().all(|s| s.winner(needed).is_some());

    if all_decided {
        if playoffs.current_round == playoffs.finals_round() {
            let champion = playoffs.rounds[playoffs.current_round][0]
                .winner(needed)
                .expect("finals decided")
                .tid;
            playoffs.champion = Some(champion);
            store.set_playoffs(Some(playoffs));

            let name = store.team(champion)?.full_name();
            sink.log_event(LogEvent::info(format!("The {} have won the championship!", name)));
            return Ok(true);
        }

        // Pair up winners for the next round; the better seed hosts.
        let winners: Vec<SeriesTeam> = playoffs.rounds[playoffs.current_round]
            .iter()
            .map(|s| *s.winner(needed).expect("round decided"))
            .collect();
        let next_round: Vec<Series> = winners
            .chunks(2)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let (mut home, mut away) = if a.seed <= b.seed { (a, b) } else { (b, a) };
                home.won = 0;
                away.won = 0;
                Series { home, away }
            })
            .collect();
        playoffs.rounds.push(next_round);
        playoffs.current_round += 1;
    }

    let round = playoffs.current_round;
    let needed = playoffs.needed[round];
    let num_games = 2 * needed - 1;
    let day = playoffs.next_day;
    let mut scheduled_any = false;

    for series in &playoffs.rounds[round] {
        if series.winner(needed).is_some() {
            continue;
        }
        let game_no = series.home.won + series.away.won;
        let (home_tid, away_tid) = if higher_seed_hosts(game_no, num_games) {
            (series.home.tid, series.away.tid)
        } else {
            (series.away.tid, series.home.tid)
        };
        store.add_scheduled_game(day, home_tid, away_tid);
        scheduled_any = true;
    }

    if scheduled_any {
        playoffs.next_day += 1;
    }
    store.set_playoffs(Some(playoffs));
    Ok(false)
}

/// Home-site pattern within a series: 2-2-1-1-1 for seven games, 2-2-1 for
/// five, alternating for shorter formats.
fn higher_seed_hosts(game_no: u8, num_games: u8) -> bool {
    match num_games {
        7 => matches!(game_no, 0 | 1 | 4 | 6),
        5 => matches!(game_no, 0 | 1 | 4),
        _ => game_no % 2 == 0,
    }
}
