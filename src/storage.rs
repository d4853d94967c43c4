//! Key-value persistence for every progression record.
//!
//! Adapters move raw JSON text. [`Storage`] layers the engine's contract on
//! top: reads never fail (absent, unreadable or unparseable values all come
//! back as the default) and writes never surface errors to the caller.
//! Every record is stored inside a `{"version": N, "data": ...}` envelope so
//! older shapes can be migrated forward on read.

use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub trait StorageAdapter: Send + Sync {
    /// Raw stored text for `key`, `None` when nothing was ever written.
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    fn write(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// A persisted entity with a fixed storage key and schema version.
pub trait Record: Serialize + DeserializeOwned + Default {
    const KEY: &'static str;
    const VERSION: u32;

    /// Upgrade `data` stored at version `from` to `from + 1`.
    ///
    /// Version 0 is the unversioned shape written by the browser build; the
    /// default treats it as already matching version 1.
    fn migrate(from: u32, data: Value) -> Option<Value> {
        (from == 0).then_some(data)
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

/// Shared handle to the configured adapter.
#[derive(Clone)]
pub struct Storage {
    adapter: Arc<dyn StorageAdapter>,
}

impl Storage {
    pub fn new(adapter: impl StorageAdapter + 'static) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    pub fn get<R: Record>(&self) -> R {
        self.get_or(R::default())
    }

    /// Stored record, or `default` when the key is absent or unusable.
    pub fn get_or<R: Record>(&self, default: R) -> R {
        match self.try_get::<R>() {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("Falling back to default for '{}': {}", R::KEY, e);
                default
            }
        }
    }

    /// Like [`Storage::get`] but reports why a stored value was unusable.
    pub fn try_get<R: Record>(&self) -> Result<Option<R>, AppError> {
        match self.adapter.read(R::KEY)? {
            Some(raw) => decode::<R>(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn set<R: Record>(&self, value: &R) {
        if let Err(e) = self.try_set(value) {
            warn!("Failed to persist '{}': {}", R::KEY, e);
        }
    }

    pub fn try_set<R: Record>(&self, value: &R) -> Result<(), AppError> {
        let envelope = Envelope {
            version: R::VERSION,
            data: value,
        };
        let raw = serde_json::to_string(&envelope)?;
        self.adapter.write(R::KEY, &raw)
    }

    /// Read-modify-write without any locking; the last writer wins.
    pub fn update<R: Record>(&self, transform: impl FnOnce(R) -> R) -> R {
        let next = transform(self.get::<R>());
        self.set(&next);
        next
    }
}

fn decode<R: Record>(raw: &str) -> Result<R, AppError> {
    let value: Value = serde_json::from_str(raw)?;
    let (mut version, mut data) = split_envelope(value);

    let unsupported = |version| AppError::UnsupportedVersion {
        key: R::KEY,
        version,
        current: R::VERSION,
    };

    if version > u64::from(R::VERSION) {
        return Err(unsupported(version));
    }
    while version < u64::from(R::VERSION) {
        let from = u32::try_from(version).map_err(|_| unsupported(version))?;
        data = R::migrate(from, data).ok_or_else(|| unsupported(version))?;
        debug!("Migrated '{}' from version {}", R::KEY, version);
        version += 1;
    }

    Ok(serde_json::from_value(data)?)
}

fn split_envelope(value: Value) -> (u64, Value) {
    match value {
        Value::Object(mut map) if is_envelope(&map) => {
            let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
            let data = map.remove("data").unwrap_or(Value::Null);
            (version, data)
        }
        other => (0, other),
    }
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.len() == 2 && map.get("version").is_some_and(Value::is_u64) && map.contains_key("data")
}

/// One JSON file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageAdapter for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| AppError::StorageUnavailable {
                key: key.to_string(),
                source,
            })
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        let unavailable = |source| AppError::StorageUnavailable {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(unavailable)?;

        // Write beside the target and rename so a crash never leaves half a record
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(unavailable)?;
        file.write_all(value.as_bytes()).map_err(unavailable)?;
        file.sync_all().map_err(unavailable)?;
        fs::rename(&temp_path, &path).map_err(unavailable)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Seed a raw value, bypassing the envelope.
    pub fn with_raw(self, key: &str, raw: &str) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), raw.to_string());
        }
        self
    }
}

impl StorageAdapter for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        let entries = self.entries.lock().map_err(|_| poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned(key))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn poisoned(key: &str) -> AppError {
    AppError::StorageUnavailable {
        key: key.to_string(),
        source: std::io::Error::other("memory storage lock poisoned"),
    }
}
