use serde::{Deserialize, Serialize};

use super::player::{Player, Position};

/// Season win/loss record plus scoring totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamSeasonRecord {
    pub won: u32,
    pub lost: u32,
    pub tied: u32,
    pub pts_for: u64,
    pub pts_against: u64,

    #[serde(default)]
    pub clinched_playoffs: bool,
}

impl TeamSeasonRecord {
    /// Standings points: two per win, one per tie.
    pub fn standing_points(&self) -> u32 {
        2 * self.won + self.tied
    }

    pub fn games_played(&self) -> u32 {
        self.won + self.lost + self.tied
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub tid: i32,
    pub region: String,
    pub name: String,

    #[serde(default)]
    pub disabled: bool,

    /// Keep the user's rotation auto-sorted before every game.
    #[serde(default)]
    pub keep_roster_sorted: bool,

    /// Rotation order as pids, best first. Resolved against live roster
    /// state when a day's games are built.
    #[serde(default)]
    pub depth: Vec<u32>,

    #[serde(default)]
    pub record: TeamSeasonRecord,
}

impl Team {
    pub fn new(tid: i32, region: &str, name: &str) -> Self {
        Self {
            tid,
            region: region.to_string(),
            name: name.to_string(),
            disabled: false,
            keep_roster_sorted: true,
            depth: Vec::new(),
            record: TeamSeasonRecord::default(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.region, self.name)
    }
}

// ============================================================================
// Per-game snapshots
// ============================================================================

/// One team's box-score aggregates for a single game, zeroed at creation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct TeamGameLine {
    pub pts: u16,
    pub fg: u16,
    pub fga: u16,
    pub reb: u16,
    pub ast: u16,
}

/// One player's stat deltas for a single game.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PlayerGameLine {
    pub min: u16,
    pub pts: u16,
    pub reb: u16,
    pub ast: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSnapshot {
    pub pid: u32,
    pub name: String,
    pub pos: Position,
    pub ovr: u8,
    pub injured: bool,
    pub stat: PlayerGameLine,
}

/// A team's full simulation-relevant state as of the moment a day's games
/// are built. Cloning one yields the isolated copy each forced-outcome trial
/// starts from, with per-game stats back at zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamSnapshot {
    pub id: i32,
    pub name: String,
    pub players: Vec<PlayerSnapshot>,
    pub stat: TeamGameLine,
}

impl TeamSnapshot {
    /// Build a snapshot from live roster state. `strength_scale` shifts
    /// effective ratings (difficulty handicap for the user's team).
    pub fn build(team: &Team, roster: &[&Player], strength_scale: f64) -> Self {
        let mut players: Vec<PlayerSnapshot> = roster
            .iter()
            .map(|p| PlayerSnapshot {
                pid: p.pid,
                name: p.name.clone(),
                pos: p.pos,
                ovr: ((p.ratings.ovr as f64) * (1.0 + strength_scale)).clamp(0.0, 100.0) as u8,
                injured: !p.can_play(),
                stat: PlayerGameLine::default(),
            })
            .collect();

        // Depth order first, anyone missing from the depth list after.
        let rank = |pid: u32| team.depth.iter().position(|&d| d == pid).unwrap_or(usize::MAX);
        players.sort_by_key(|p| (rank(p.pid), p.pid));

        Self { id: team.tid, name: team.full_name(), players, stat: TeamGameLine::default() }
    }

    /// Re-resolve the playable rotation: healthy players keep their depth
    /// order, injured players sink to the end. Run after any copy, so the
    /// order reflects the roster actually dressing for this simulation.
    pub fn resolve_lineup(&mut self) {
        self.players.sort_by_key(|p| p.injured);
    }

    pub fn healthy_count(&self) -> usize {
        self.players.iter().filter(|p| !p.injured).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::{Contract, Injury, Ratings};

    fn make_player(pid: u32, ovr: u8, injured: bool) -> Player {
        Player {
            pid,
            tid: 0,
            name: format!("Player {pid}"),
            pos: Position::F,
            ratings: Ratings { ovr, pot: ovr },
            value: ovr as f32,
            contract: Contract { amount: 750, exp: 2 },
            injury: if injured {
                Injury { kind: "Sprained Ankle".to_string(), games_remaining: 3, score: 25 }
            } else {
                Injury::healthy()
            },
            p_fatigue: None,
            games_until_tradable: Some(0),
            stats: Default::default(),
        }
    }

    #[test]
    fn test_snapshot_starts_with_zeroed_stats() {
        let mut team = Team::new(0, "Test", "Squad");
        team.depth = vec![2, 1];
        let p1 = make_player(1, 60, false);
        let p2 = make_player(2, 70, false);

        let snap = TeamSnapshot::build(&team, &[&p1, &p2], 0.0);

        assert_eq!(snap.stat, TeamGameLine::default());
        assert!(snap.players.iter().all(|p| p.stat == PlayerGameLine::default()));
        // Depth order puts pid 2 first.
        assert_eq!(snap.players[0].pid, 2);
    }

    #[test]
    fn test_resolve_lineup_sinks_injured_players() {
        let mut team = Team::new(0, "Test", "Squad");
        team.depth = vec![1, 2, 3];
        let p1 = make_player(1, 80, true);
        let p2 = make_player(2, 70, false);
        let p3 = make_player(3, 60, false);

        let mut snap = TeamSnapshot::build(&team, &[&p1, &p2, &p3], 0.0);
        snap.resolve_lineup();

        assert_eq!(snap.players.last().unwrap().pid, 1);
        assert_eq!(snap.healthy_count(), 2);
    }

    #[test]
    fn test_clone_is_isolated() {
        let team = Team::new(0, "Test", "Squad");
        let p1 = make_player(1, 60, false);
        let base = TeamSnapshot::build(&team, &[&p1], 0.0);

        let mut trial = base.clone();
        trial.stat.pts = 101;
        trial.players[0].stat.pts = 30;

        assert_eq!(base.stat.pts, 0);
        assert_eq!(base.players[0].stat.pts, 0);
    }
}
