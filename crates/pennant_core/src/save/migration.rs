use super::error::SaveError;
use super::format::SeasonSave;
use super::SAVE_VERSION;

/// Brings an older save up to the current format.
pub fn migrate_save(mut save: SeasonSave) -> Result<SeasonSave, SaveError> {
    let original_version = save.version;

    save = match save.version {
        0 => migrate_v0_to_v1(save),
        1 => save,
        v if v > SAVE_VERSION => {
            log::warn!("Loading save from future version {} (current: {})", v, SAVE_VERSION);
            save
        }
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    save.version = SAVE_VERSION;
    if original_version != SAVE_VERSION {
        save.update_timestamp();
        log::info!("Migrated save from version {} to {}", original_version, SAVE_VERSION);
    }
    Ok(save)
}

/// Version 0 wrote the day just played rather than the next one to play,
/// and did not wrap rotation cursors after a staff shrank.
fn migrate_v0_to_v1(mut save: SeasonSave) -> SeasonSave {
    log::info!("Migrating save from version 0 to 1");
    save.season.next_day += 1;
    for team in save.season.teams.values_mut() {
        let size = team.rotation_size();
        if size == 0 {
            team.rotation_cursor = 0;
        } else if team.rotation_cursor >= size {
            log::warn!("{} rotation cursor {} reset", team.name, team.rotation_cursor);
            team.rotation_cursor %= size;
        }
    }
    save
}

pub fn needs_migration(save: &SeasonSave) -> bool {
    save.version < SAVE_VERSION
}
