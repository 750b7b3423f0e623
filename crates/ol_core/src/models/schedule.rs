use serde::{Deserialize, Serialize};

/// Sentinel team ids for special schedule entries.
pub const ALL_STAR_HOME_TID: i32 = -1;
pub const ALL_STAR_AWAY_TID: i32 = -2;
pub const TRADE_DEADLINE_TID: i32 = -3;

/// A scripted result set through privileged (god mode) editing. Consumed
/// when the game resolves; never persisted past that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ForcedOutcome {
    Team(i32),
    Tie,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledGame {
    pub gid: u32,
    pub day: u16,
    pub home_tid: i32,
    pub away_tid: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_win: Option<ForcedOutcome>,
}

impl ScheduledGame {
    /// Placeholder marking "trade deadline has arrived, no game today".
    pub fn is_trade_deadline(&self) -> bool {
        self.home_tid == TRADE_DEADLINE_TID && self.away_tid == TRADE_DEADLINE_TID
    }

    pub fn is_all_star(&self) -> bool {
        self.home_tid == ALL_STAR_HOME_TID && self.away_tid == ALL_STAR_AWAY_TID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_detection() {
        let deadline = ScheduledGame {
            gid: 1,
            day: 30,
            home_tid: TRADE_DEADLINE_TID,
            away_tid: TRADE_DEADLINE_TID,
            force_win: None,
        };
        assert!(deadline.is_trade_deadline());
        assert!(!deadline.is_all_star());

        let all_star = ScheduledGame {
            gid: 2,
            day: 41,
            home_tid: ALL_STAR_HOME_TID,
            away_tid: ALL_STAR_AWAY_TID,
            force_win: None,
        };
        assert!(all_star.is_all_star());
        assert!(!all_star.is_trade_deadline());
    }

    #[test]
    fn test_force_win_not_serialized_when_absent() {
        let game =
            ScheduledGame { gid: 3, day: 1, home_tid: 0, away_tid: 1, force_win: None };
        let json = serde_json::to_string(&game).unwrap();
        assert!(!json.contains("force_win"));
    }
}
