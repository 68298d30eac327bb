//! On-disk save layout: MessagePack with field names, LZ4 compressed with
//! the size prepended, followed by a 32-byte SHA-256 of the compressed
//! payload.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::error::SaveError;
use super::SAVE_VERSION;
use crate::season::SeasonState;

const CHECKSUM_LEN: usize = 32;

/// A season frozen at a day boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeasonSave {
    /// Save format version for migration
    pub version: u32,
    /// Unix milliseconds
    pub timestamp: u64,
    pub league: String,
    pub season: SeasonState,
}

impl SeasonSave {
    pub fn new(league: impl Into<String>, season: SeasonState) -> Self {
        Self { version: SAVE_VERSION, timestamp: current_timestamp(), league: league.into(), season }
    }

    pub fn seed(&self) -> u64 {
        self.season.seed
    }

    pub fn next_day(&self) -> u32 {
        self.season.next_day
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.season.teams.is_empty() {
            return Err(SaveError::Corrupted("no teams".to_string()));
        }
        if let Some((key, team)) = self.season.teams.iter().find(|(key, team)| **key != team.id) {
            return Err(SaveError::Corrupted(format!(
                "team {} stored under id {}",
                team.id, key
            )));
        }
        if self.season.next_day == 0 {
            return Err(SaveError::Corrupted("day 0 is not a day boundary".to_string()));
        }
        Ok(())
    }
}

pub fn serialize_and_compress(save: &SeasonSave) -> Result<Vec<u8>, SaveError> {
    save.validate()?;

    let msgpack = to_vec_named(save)?;
    let mut bytes = compress_prepend_size(&msgpack);
    let checksum = Sha256::digest(&bytes);
    bytes.extend_from_slice(&checksum);
    Ok(bytes)
}

/// Checks the trailer before touching the payload. A save newer than this
/// build is rejected here; older ones are left to migration.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<SeasonSave, SaveError> {
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(SaveError::Corrupted(format!("{} bytes is too short", bytes.len())));
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let save: SeasonSave = from_slice(&msgpack)?;
    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }
    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
