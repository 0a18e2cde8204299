// Reads and writes the JSON documents the parser consumes and produces.
//
// Every read and write of a document happens under an exclusive sidecar lock
// (`<file>.json.lock`). Writes go to a temp file that is renamed over the
// target. The roster pair is guarded by the cast document's lock.
use crate::model::roster::{CastDocument, GroupMappings, Roster};
use crate::model::schedule::Schedule;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        Ok(())
    }

    fn require(path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("Required file not found: {}", path.display());
        }
        Ok(())
    }

    /// Caller must hold the lock for `path`.
    fn parse_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Caller must hold the lock for `path`.
    fn store_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        Self::atomic_write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Reads a required JSON document. A missing file is an error, not a default.
    pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
        Self::require(path)?;
        Self::with_lock(path, || Self::parse_json(path))
    }

    pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        Self::ensure_parent(path)?;
        Self::with_lock(path, || Self::store_json(path, value))
    }

    /// Reads the call sheet text, dropping a UTF-8 byte-order mark if present.
    pub fn read_text(path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schedule source {}", path.display()))?;
        Ok(match text.strip_prefix('\u{feff}') {
            Some(stripped) => stripped.to_string(),
            None => text,
        })
    }
}

/// The cast roster and its group aliases, stored as two sibling documents.
pub struct RosterStorage {
    pub cast_path: PathBuf,
    pub mappings_path: PathBuf,
}

impl RosterStorage {
    pub fn new(cast_path: PathBuf, mappings_path: PathBuf) -> Self {
        Self {
            cast_path,
            mappings_path,
        }
    }

    /// Both documents must exist; parsing cannot start without them.
    /// The cast lock is held while both are read, so a concurrent save is
    /// never seen half done.
    pub fn load(&self) -> Result<Roster> {
        LocalStorage::require(&self.cast_path).context("Cannot load the cast roster")?;
        let (cast, mappings) = LocalStorage::with_lock(&self.cast_path, || {
            let cast: CastDocument = LocalStorage::parse_json(&self.cast_path)
                .context("Cannot load the cast roster")?;
            let mappings: GroupMappings = LocalStorage::read_json(&self.mappings_path)
                .context("Cannot load the group mappings")?;
            Ok((cast, mappings))
        })?;
        log::debug!(
            "Loaded {} actors and {} group aliases",
            cast.actors.len(),
            mappings.len()
        );
        Ok(Roster::from_documents(cast, mappings))
    }

    /// Writes both documents under the cast lock.
    pub fn save(&self, roster: &Roster) -> Result<()> {
        let (cast, mappings) = roster.to_documents();
        LocalStorage::ensure_parent(&self.cast_path)?;
        LocalStorage::with_lock(&self.cast_path, || {
            LocalStorage::store_json(&self.cast_path, &cast)?;
            LocalStorage::write_json(&self.mappings_path, &mappings)
        })?;
        log::info!(
            "Cast list saved to {}. Group mappings saved to {}.",
            self.cast_path.display(),
            self.mappings_path.display()
        );
        Ok(())
    }
}

pub struct ScheduleStorage;

impl ScheduleStorage {
    pub fn save(path: &Path, schedule: &Schedule) -> Result<()> {
        LocalStorage::write_json(path, schedule)?;
        log::info!("Schedule saved to {}.", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Schedule> {
        LocalStorage::read_json(path)
    }
}
