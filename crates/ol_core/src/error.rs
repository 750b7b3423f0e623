use thiserror::Error;

/// Crate-wide error type.
///
/// Missing-entity variants indicate corrupted league state (an id that must
/// exist does not) and are unrecoverable for the current run. Storage and
/// save failures propagate to the caller without retry.
#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("team {0} does not exist")]
    MissingTeam(i32),

    #[error("player {0} does not exist")]
    MissingPlayer(u32),

    #[error("scheduled game {0} does not exist")]
    MissingGame(u32),

    #[error("no playoff series state for season {0}")]
    MissingPlayoffs(u16),

    #[error("save error: {0}")]
    Save(#[from] crate::save::SaveError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LeagueError>;
