//! Season save/load: MessagePack + LZ4 with a SHA-256 trailer, versioned
//! with a migration step.

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, SeasonSave};
pub use manager::{SaveManager, SaveSlotInfo, SLOT_COUNT};
pub use migration::migrate_save;

pub const SAVE_VERSION: u32 = 1;
