//! Hash store: SHA-256 digests of the last content pushed to the mirror.
//!
//! Persists a `HashStoreFile` JSON document at
//! `<home>/.giftdraw/hashes/<event>.json`, keyed by remote path.
//! Writes use the same atomic `.tmp` + rename pattern as the event tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use giftdraw_core::{store::root_at, EventName};

use crate::error::{io_err, SyncError};

/// Remote path → hex SHA-256 of the last pushed content.
pub type HashStore = HashMap<String, String>;

/// On-disk hash store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashStoreFile {
    /// `None` until the first successful push.
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub files: HashStore,
}

/// `~/.giftdraw/hashes/<event>.json`
pub fn store_path_at(home: &Path, event: &EventName) -> PathBuf {
    root_at(home).join("hashes").join(format!("{}.json", event.0))
}

/// Hex SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Load the hash store for `event`. Returns an empty store if the file does
/// not yet exist.
pub fn load_at(home: &Path, event: &EventName) -> Result<HashStoreFile, SyncError> {
    event.check()?;
    let path = store_path_at(home, event);
    if !path.exists() {
        return Ok(HashStoreFile { pushed_at: None, files: HashMap::new() });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the hash store for `event` atomically.
pub fn save_at(home: &Path, event: &EventName, store: &HashStoreFile) -> Result<(), SyncError> {
    event.check()?;
    let path = store_path_at(home, event);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid hash store path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}
