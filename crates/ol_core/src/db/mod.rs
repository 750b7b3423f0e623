//! In-memory league store.
//!
//! Point and range lookups over the Teams, Players, Schedule, Playoff-Series
//! and Game-Attributes collections, with get/put/delete semantics. Backed by
//! `BTreeMap`s so iteration order is deterministic, which downstream
//! consumers (schedule-order result persistence, auto-sign passes) rely on.
//!
//! Lookups that must succeed return `LeagueError` on a miss: a missing id
//! indicates corrupted league state, not a recoverable runtime condition.

use std::collections::BTreeMap;

use crate::error::{LeagueError, Result};
use crate::models::{GameAttributes, GameResult, Player, ScheduledGame, Team};
use crate::season::playoffs::PlayoffsState;
use crate::stats::SeasonLeaders;

#[derive(Debug, Clone, Default)]
pub struct LeagueStore {
    attributes: GameAttributes,
    teams: BTreeMap<i32, Team>,
    players: BTreeMap<u32, Player>,
    schedule: BTreeMap<u32, ScheduledGame>,
    games: BTreeMap<u32, GameResult>,
    playoffs: Option<PlayoffsState>,

    // Derived caches, never saved.
    season_leaders: Option<SeasonLeaders>,
    team_ovrs: BTreeMap<i32, f32>,

    next_gid: u32,
    next_pid: u32,
}

impl LeagueStore {
    pub fn new(attributes: GameAttributes) -> Self {
        Self { attributes, next_gid: 1, next_pid: 1, ..Default::default() }
    }

    // ========================================================================
    // Game attributes
    // ========================================================================

    pub fn attrs(&self) -> &GameAttributes {
        &self.attributes
    }

    pub fn attrs_mut(&mut self) -> &mut GameAttributes {
        &mut self.attributes
    }

    // ========================================================================
    // Teams
    // ========================================================================

    pub fn team(&self, tid: i32) -> Result<&Team> {
        self.teams.get(&tid).ok_or(LeagueError::MissingTeam(tid))
    }

    pub fn team_mut(&mut self, tid: i32) -> Result<&mut Team> {
        self.teams.get_mut(&tid).ok_or(LeagueError::MissingTeam(tid))
    }

    pub fn put_team(&mut self, team: Team) {
        self.teams.insert(team.tid, team);
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.values()
    }

    /// Tids of all non-disabled franchises, ascending. Sentinel teams
    /// (negative tids backing exhibition matchups) are not franchises.
    pub fn active_tids(&self) -> Vec<i32> {
        self.teams.values().filter(|t| !t.disabled && t.tid >= 0).map(|t| t.tid).collect()
    }

    // ========================================================================
    // Players
    // ========================================================================

    pub fn player(&self, pid: u32) -> Result<&Player> {
        self.players.get(&pid).ok_or(LeagueError::MissingPlayer(pid))
    }

    pub fn player_mut(&mut self, pid: u32) -> Result<&mut Player> {
        self.players.get_mut(&pid).ok_or(LeagueError::MissingPlayer(pid))
    }

    pub fn put_player(&mut self, player: Player) {
        self.next_pid = self.next_pid.max(player.pid + 1);
        self.players.insert(player.pid, player);
    }

    pub fn delete_player(&mut self, pid: u32) -> Result<Player> {
        self.players.remove(&pid).ok_or(LeagueError::MissingPlayer(pid))
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn next_pid(&mut self) -> u32 {
        let pid = self.next_pid;
        self.next_pid += 1;
        pid
    }

    /// Pids of players on the given roster, ascending.
    pub fn pids_by_tid(&self, tid: i32) -> Vec<u32> {
        self.players.values().filter(|p| p.tid == tid).map(|p| p.pid).collect()
    }

    /// Pids of all rostered players (tid >= 0), ascending. Free agents are
    /// handled by their own housekeeping pass.
    pub fn rostered_pids(&self) -> Vec<u32> {
        self.players.values().filter(|p| p.tid >= 0).map(|p| p.pid).collect()
    }

    pub fn free_agent_pids(&self) -> Vec<u32> {
        self.players.values().filter(|p| p.is_free_agent()).map(|p| p.pid).collect()
    }

    // ========================================================================
    // Schedule
    // ========================================================================

    pub fn add_scheduled_game(
        &mut self,
        day: u16,
        home_tid: i32,
        away_tid: i32,
    ) -> u32 {
        let gid = self.next_gid;
        self.next_gid += 1;
        self.schedule.insert(
            gid,
            ScheduledGame { gid, day, home_tid, away_tid, force_win: None },
        );
        gid
    }

    pub fn scheduled_game(&self, gid: u32) -> Result<&ScheduledGame> {
        self.schedule.get(&gid).ok_or(LeagueError::MissingGame(gid))
    }

    pub fn scheduled_game_mut(&mut self, gid: u32) -> Result<&mut ScheduledGame> {
        self.schedule.get_mut(&gid).ok_or(LeagueError::MissingGame(gid))
    }

    pub fn delete_scheduled_game(&mut self, gid: u32) -> Result<ScheduledGame> {
        self.schedule.remove(&gid).ok_or(LeagueError::MissingGame(gid))
    }

    pub fn schedule_len(&self) -> usize {
        self.schedule.len()
    }

    /// Full remaining schedule ordered by day, then gid.
    pub fn schedule_ordered(&self) -> Vec<ScheduledGame> {
        let mut games: Vec<ScheduledGame> = self.schedule.values().cloned().collect();
        games.sort_by_key(|g| (g.day, g.gid));
        games
    }

    // ========================================================================
    // Completed games
    // ========================================================================

    pub fn put_game_result(&mut self, result: GameResult) {
        self.games.insert(result.gid, result);
    }

    pub fn game_result(&self, gid: u32) -> Result<&GameResult> {
        self.games.get(&gid).ok_or(LeagueError::MissingGame(gid))
    }

    pub fn game_results(&self) -> impl Iterator<Item = &GameResult> {
        self.games.values()
    }

    /// Day number of the most recently completed game.
    pub fn last_completed_day(&self) -> u16 {
        self.games.values().map(|g| g.day).max().unwrap_or(0)
    }

    // ========================================================================
    // Playoff series
    // ========================================================================

    pub fn playoffs(&self) -> Option<&PlayoffsState> {
        self.playoffs.as_ref()
    }

    pub fn playoffs_mut(&mut self) -> Option<&mut PlayoffsState> {
        self.playoffs.as_mut()
    }

    pub fn set_playoffs(&mut self, playoffs: Option<PlayoffsState>) {
        self.playoffs = playoffs;
    }

    // ========================================================================
    // Derived caches
    // ========================================================================

    pub fn season_leaders_cache(&self) -> Option<&SeasonLeaders> {
        self.season_leaders.as_ref()
    }

    pub fn set_season_leaders_cache(&mut self, leaders: SeasonLeaders) {
        self.season_leaders = Some(leaders);
    }

    pub fn invalidate_season_leaders(&mut self) {
        self.season_leaders = None;
    }

    pub fn team_ovr(&self, tid: i32) -> Option<f32> {
        self.team_ovrs.get(&tid).copied()
    }

    pub fn set_team_ovr(&mut self, tid: i32, ovr: f32) {
        self.team_ovrs.insert(tid, ovr);
    }

    // ========================================================================
    // Save conversion
    // ========================================================================

    pub fn to_save(&self) -> crate::save::LeagueSave {
        crate::save::LeagueSave {
            version: crate::save::SAVE_VERSION,
            timestamp: crate::save::format::current_timestamp(),
            attributes: self.attributes.clone(),
            teams: self.teams.values().cloned().collect(),
            players: self.players.values().cloned().collect(),
            schedule: self.schedule.values().cloned().collect(),
            games: self.games.values().cloned().collect(),
            playoffs: self.playoffs.clone(),
        }
    }

    pub fn from_save(save: &crate::save::LeagueSave) -> Self {
        let mut store = Self::new(save.attributes.clone());
        for team in &save.teams {
            store.put_team(team.clone());
        }
        for player in &save.players {
            store.put_player(player.clone());
        }
        for game in &save.schedule {
            store.schedule.insert(game.gid, game.clone());
            store.next_gid = store.next_gid.max(game.gid + 1);
        }
        for result in &save.games {
            store.next_gid = store.next_gid.max(result.gid + 1);
            store.put_game_result(result.clone());
        }
        store.playoffs = save.playoffs.clone();
        store
    }
}
