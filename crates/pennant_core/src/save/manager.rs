use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, SeasonSave};
use super::migration::migrate_save;

/// Number of manual save slots.
pub const SLOT_COUNT: u8 = 3;

/// Save files under one directory: numbered slots plus an autosave that the
/// season runner overwrites at each day boundary.
#[derive(Debug, Clone)]
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_to_slot(&self, slot: u8, save: &SeasonSave) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;
        Self::save_to_path(&self.slot_path(slot), save)?;
        log::info!("Season saved to slot {} (next day {})", slot, save.next_day());
        Ok(())
    }

    pub fn load_from_slot(&self, slot: u8) -> Result<SeasonSave, SaveError> {
        Self::validate_slot(slot)?;
        let save = Self::load_from_path(&self.slot_path(slot))?;
        log::info!("Season loaded from slot {}", slot);
        Ok(save)
    }

    pub fn auto_save(&self, save: &SeasonSave) -> Result<(), SaveError> {
        Self::save_to_path(&self.auto_save_path(), save)?;
        log::debug!("Auto-save completed for day {}", save.next_day().saturating_sub(1));
        Ok(())
    }

    pub fn load_auto_save(&self) -> Result<SeasonSave, SaveError> {
        let save = Self::load_from_path(&self.auto_save_path())?;
        log::info!("Auto-save loaded");
        Ok(save)
    }

    pub fn slot_exists(&self, slot: u8) -> bool {
        Self::validate_slot(slot).is_ok() && self.slot_path(slot).exists()
    }

    pub fn auto_save_exists(&self) -> bool {
        self.auto_save_path().exists()
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

    pub fn slot_info(&self, slot: u8) -> Result<Option<SaveSlotInfo>, SaveError> {
        Self::validate_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let save = Self::load_from_path(&path)?;
        Ok(Some(SaveSlotInfo {
            slot,
            timestamp: save.timestamp,
            version: save.version,
            league: save.league.clone(),
            next_day: save.next_day(),
            games_played: save.season.game_log.len(),
        }))
    }

    /// Readable slots, most recent first.
    pub fn all_slot_info(&self) -> Vec<SaveSlotInfo> {
        let mut slots: Vec<SaveSlotInfo> =
            (0..SLOT_COUNT).filter_map(|slot| self.slot_info(slot).ok().flatten()).collect();
        slots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        slots
    }

    fn validate_slot(slot: u8) -> Result<(), SaveError> {
        if slot >= SLOT_COUNT {
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

    /// Writes to a temp file and renames it over the target, so a crash
    /// leaves either the old save or the new one.
    pub fn save_to_path(path: &Path, save: &SeasonSave) -> Result<(), SaveError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serialize_and_compress(save)?;
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, path)?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(())
    }

    pub fn load_from_path(path: &Path) -> Result<SeasonSave, SaveError> {
        if !path.exists() {
            return Err(SaveError::FileNotFound { path: path.display().to_string() });
        }

        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        let save = migrate_save(decompress_and_deserialize(&data)?)?;

        log::debug!("Loaded {} bytes from {:?}", data.len(), path);
        Ok(save)
    }
}

#[derive(Debug, Clone)]
pub struct SaveSlotInfo {
    pub slot: u8,
    pub timestamp: u64,
    pub version: u32,
    pub league: String,
    pub next_day: u32,
    pub games_played: usize,
}

impl SaveSlotInfo {
    pub fn format_timestamp(&self) -> String {
        use time::{format_description::well_known::Rfc3339, OffsetDateTime};

        let timestamp =
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.timestamp) * 1_000_000)
                .unwrap_or_else(|_| OffsetDateTime::now_utc());

        timestamp.format(&Rfc3339).unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn display_text(&self) -> String {
        format!(
            "Slot {}: {} before day {} ({} games played)",
            self.slot, self.league, self.next_day, self.games_played
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::models::TeamId;
    use crate::season::SeasonState;
    use tempfile::TempDir;

    fn save() -> SeasonSave {
        let teams = vec![fixtures::synthetic_team(TeamId(1), 1), fixtures::synthetic_team(TeamId(2), 2)];
        SeasonSave::new("Test League", SeasonState::new(teams, 8))
    }

    #[test]
    fn test_atomic_save() {
        let temp_dir = TempDir::new().unwrap();
        let save_path = temp_dir.path().join("atomic_test.dat");
        let original = save();

        SaveManager::save_to_path(&save_path, &original).unwrap();
        assert!(save_path.exists());
        assert!(!save_path.with_extension("tmp").exists());
        assert_eq!(SaveManager::load_from_path(&save_path).unwrap(), original);
    }

    #[test]
    fn test_slots() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path().join("saves"));
        let original = save();

        assert!(!manager.slot_exists(1));
        manager.save_to_slot(1, &original).unwrap();
        assert!(manager.slot_exists(1));
        assert_eq!(manager.load_from_slot(1).unwrap(), original);

        let info = manager.all_slot_info();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].next_day, 1);
        assert!(info[0].display_text().contains("Test League"));
        assert!(!info[0].format_timestamp().is_empty());

        manager.delete_slot(1).unwrap();
        assert!(!manager.slot_exists(1));
        assert!(matches!(manager.load_from_slot(1), Err(SaveError::FileNotFound { .. })));
    }

    #[test]
    fn test_auto_save() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path());
        assert!(!manager.auto_save_exists());
        manager.auto_save(&save()).unwrap();
        assert!(manager.auto_save_exists());
        assert_eq!(manager.load_auto_save().unwrap().league, "Test League");
    }

    #[test]
    fn test_slot_validation() {
        let manager = SaveManager::new(".");
        assert!(SaveManager::validate_slot(0).is_ok());
        assert!(SaveManager::validate_slot(2).is_ok());
        assert!(matches!(manager.save_to_slot(3, &save()), Err(SaveError::InvalidSlot { slot: 3 })));
        assert!(!manager.slot_exists(255));
    }
}
