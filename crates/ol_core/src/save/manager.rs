use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, LeagueSave};
use super::migration::migrate_save;

use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::db::LeagueStore;

const NUM_SLOTS: u8 = 3;

/// Save file management over a base directory: numbered slots plus an
/// auto-save used for the end-of-run persistence flush.
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save the league to a specific slot.
    pub fn save_to_slot(&self, slot: u8, store: &LeagueStore) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;

        let path = self.slot_path(slot);
        Self::save_to_path(&path, &store.to_save())?;

        log::info!("League saved to slot {}", slot);
        Ok(())
    }

    /// Load the league from a specific slot.
    pub fn load_from_slot(&self, slot: u8) -> Result<LeagueStore, SaveError> {
        Self::validate_slot(slot)?;

        let save = Self::load_from_path(&self.slot_path(slot))?;
        log::info!("League loaded from slot {}", slot);
        Ok(LeagueStore::from_save(&save))
    }

    /// Persist the current league state to the auto-save file.
    pub fn auto_save(&self, store: &LeagueStore) -> Result<(), SaveError> {
        Self::save_to_path(&self.auto_save_path(), &store.to_save())?;
        log::debug!("Auto-save completed");
        Ok(())
    }

    pub fn load_auto_save(&self) -> Result<LeagueStore, SaveError> {
        let save = Self::load_from_path(&self.auto_save_path())?;
        log::info!("Auto-save loaded");
        Ok(LeagueStore::from_save(&save))
    }

    pub fn slot_exists(&self, slot: u8) -> bool {
        Self::validate_slot(slot).is_ok() && self.slot_path(slot).exists()
    }

    pub fn delete_slot(&self, slot: u8) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;

        let path = self.slot_path(slot);
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted save slot {}", slot);
        }

        Ok(())
    }

    // Private helper methods

    fn validate_slot(slot: u8) -> Result<(), SaveError> {
        if slot >= NUM_SLOTS {
            return Err(SaveError::InvalidSlot { slot });
        }
        Ok(())
    }

    fn slot_path(&self, slot: u8) -> PathBuf {
        self.dir.join(format!("save_slot_{}.dat", slot))
    }

    fn auto_save_path(&self) -> PathBuf {
        self.dir.join("auto_save.dat")
    }

    fn save_to_path(path: &Path, save: &LeagueSave) -> Result<(), SaveError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serialize_and_compress(save)?;

        // Atomic save: write to temp file, then rename
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;

            // sync_all ensures data is written to disk (portable fsync)
            file.sync_all()?;
        }

        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<LeagueSave, SaveError> {
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }

        let mut file = File::open(path)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let mut save = decompress_and_deserialize(&data)?;

        // Apply migrations if needed
        save = migrate_save(save)?;

        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GameAttributes;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());

        let mut store = LeagueStore::new(GameAttributes { season: 4, ..Default::default() });
        store.add_scheduled_game(1, 0, 1);

        assert!(!manager.slot_exists(0));
        manager.save_to_slot(0, &store).unwrap();
        assert!(manager.slot_exists(0));

        let loaded = manager.load_from_slot(0).unwrap();
        assert_eq!(loaded.attrs().season, 4);
        assert_eq!(loaded.schedule_len(), 1);

        manager.delete_slot(0).unwrap();
        assert!(!manager.slot_exists(0));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());
        let store = LeagueStore::new(GameAttributes::default());

        manager.auto_save(&store).unwrap();

        assert!(temp_dir.path().join("auto_save.dat").exists());
        assert!(!temp_dir.path().join("auto_save.tmp").exists());
    }

    #[test]
    fn test_slot_validation() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());
        let store = LeagueStore::new(GameAttributes::default());

        assert!(manager.save_to_slot(2, &store).is_ok());
        assert!(matches!(
            manager.save_to_slot(3, &store),
            Err(SaveError::InvalidSlot { slot: 3 })
        ));
    }
}
