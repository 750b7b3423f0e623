use serde::{Deserialize, Serialize};

use super::player::Injury;
use super::team::{PlayerGameLine, TeamGameLine};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamLine {
    pub tid: i32,
    pub stat: TeamGameLine,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerLine {
    pub pid: u32,
    pub tid: i32,
    pub stat: PlayerGameLine,

    /// A new injury assigned during this game, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_new: Option<Injury>,
}

/// The outcome of one simulated game. `teams[0]` is always the home side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameResult {
    pub gid: u32,
    pub day: u16,
    pub teams: [TeamLine; 2],
    pub players: Vec<PlayerLine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_by_play: Option<Vec<String>>,

    /// For forced games, the 1-based trial at which the scripted outcome
    /// appeared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_win_trials: Option<u32>,
}

impl GameResult {
    /// The winner's tid, or `None` for a tie. Strictly-greater points decide.
    pub fn winner_tid(&self) -> Option<i32> {
        let home = self.teams[0].stat.pts;
        let away = self.teams[1].stat.pts;
        if home > away {
            Some(self.teams[0].tid)
        } else if away > home {
            Some(self.teams[1].tid)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_score(home: u16, away: u16) -> GameResult {
        GameResult {
            gid: 1,
            day: 1,
            teams: [
                TeamLine { tid: 10, stat: TeamGameLine { pts: home, ..Default::default() } },
                TeamLine { tid: 20, stat: TeamGameLine { pts: away, ..Default::default() } },
            ],
            players: Vec::new(),
            play_by_play: None,
            force_win_trials: None,
        }
    }

    #[test]
    fn test_winner_requires_strictly_more_points() {
        assert_eq!(result_with_score(100, 98).winner_tid(), Some(10));
        assert_eq!(result_with_score(98, 100).winner_tid(), Some(20));
        assert_eq!(result_with_score(99, 99).winner_tid(), None);
    }
}
