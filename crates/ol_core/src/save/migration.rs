use super::error::SaveError;
use super::format::LeagueSave;
use super::SAVE_VERSION;

/// Migrate save data from older versions to the current version.
pub fn migrate_save(mut save: LeagueSave) -> Result<LeagueSave, SaveError> {
    let original_version = save.version;

    save = match save.version {
        0 => migrate_v0_to_v1(save)?,
        1 => save, // Current version, no migration needed
        v if v > SAVE_VERSION => {
            // Future version - might be compatible
            log::warn!("Loading save from future version {} (current: {})", v, SAVE_VERSION);
            save
        }
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    save.version = SAVE_VERSION;

    if original_version != SAVE_VERSION {
        log::info!("Migrated save from version {} to {}", original_version, SAVE_VERSION);
    }

    Ok(save)
}

/// Migrate from version 0 to version 1.
fn migrate_v0_to_v1(mut save: LeagueSave) -> Result<LeagueSave, SaveError> {
    log::info!("Migrating save from version 0 to 1");

    // Fields added since v0 deserialize to their defaults; fix up the
    // inconsistencies defaults cannot express.
    if save.attributes.season == 0 {
        save.attributes.season = 1;
    }

    // v0 predates the trade-eligibility countdown.
    for player in &mut save.players {
        if player.games_until_tradable.is_none() {
            player.games_until_tradable = Some(0);
        }
    }

    // Drop playoff state that references a different season than the save.
    if let Some(playoffs) = &save.playoffs {
        if playoffs.season != save.attributes.season {
            log::warn!(
                "Discarding playoff state for season {} (save is season {})",
                playoffs.season,
                save.attributes.season
            );
            save.playoffs = None;
        }
    }

    Ok(save)
}
