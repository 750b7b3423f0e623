pub mod attributes;
pub mod phase;
pub mod player;
pub mod result;
pub mod schedule;
pub mod team;

pub use attributes::GameAttributes;
pub use phase::Phase;
pub use player::{Contract, Injury, Player, PlayerSeasonStats, Position, Ratings, FREE_AGENT_TID};
pub use result::{GameResult, PlayerLine, TeamLine};
pub use schedule::{
    ForcedOutcome, ScheduledGame, ALL_STAR_AWAY_TID, ALL_STAR_HOME_TID, TRADE_DEADLINE_TID,
};
pub use team::{PlayerGameLine, PlayerSnapshot, Team, TeamGameLine, TeamSeasonRecord, TeamSnapshot};
