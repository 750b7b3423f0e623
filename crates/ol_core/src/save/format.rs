use serde::{Deserialize, Serialize};

use super::error::SaveError;
use super::SAVE_VERSION;
use crate::models::{GameAttributes, GameResult, Player, ScheduledGame, Team};
use crate::season::playoffs::PlayoffsState;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

/// Complete league snapshot with all persistent data.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LeagueSave {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub timestamp: u64,

    pub attributes: GameAttributes,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub schedule: Vec<ScheduledGame>,
    pub games: Vec<GameResult>,

    #[serde(default)]
    pub playoffs: Option<PlayoffsState>,
}

impl LeagueSave {
    pub fn validate(&self) -> Result<(), SaveError> {
        let mut pids = std::collections::HashSet::new();
        for player in &self.players {
            if !pids.insert(player.pid) {
                return Err(SaveError::Corrupted);
            }
        }

        let mut gids = std::collections::HashSet::new();
        for game in &self.schedule {
            if !gids.insert(game.gid) {
                return Err(SaveError::Corrupted);
            }
        }

        Ok(())
    }
}

/// Serialize and compress a league snapshot.
pub fn serialize_and_compress(save: &LeagueSave) -> Result<Vec<u8>, SaveError> {
    save.validate()?;

    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(save).map_err(SaveError::Serialization)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize a league snapshot.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<LeagueSave, SaveError> {
    // Check minimum size (header + checksum)
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;

    let save: LeagueSave = from_slice(&msgpack).map_err(SaveError::Deserialization)?;

    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }

    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
