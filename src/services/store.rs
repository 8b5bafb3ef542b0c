//! Stores for the persisted timer record

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tracing::debug;

use crate::{engine::Store, state::TimerRecord};

/// Fixed key the record is kept under
pub const STORE_KEY: &str = "flomodoro-state";

/// Keeps the record as a JSON file named after [`STORE_KEY`]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store the record inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", STORE_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for JsonFileStore {
    fn save(&mut self, record: &TimerRecord) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let json = record.to_json().context("Failed to encode timer record")?;

        // Write then rename so a crash never leaves half a record behind
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!("Saved timer record to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> anyhow::Result<Option<TimerRecord>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let record = TimerRecord::from_json(&text);
                if record.is_none() {
                    debug!("Ignoring malformed record in {}", self.path.display());
                }
                Ok(record)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", self.path.display())),
        }
    }
}

/// In-process store holding the encoded record
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    json: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with raw text already saved, as if written by an earlier run
    pub fn with_raw(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            saves: 0,
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn save(&mut self, record: &TimerRecord) -> anyhow::Result<()> {
        self.json = Some(record.to_json().context("Failed to encode timer record")?);
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> anyhow::Result<Option<TimerRecord>> {
        Ok(self.json.as_deref().and_then(TimerRecord::from_json))
    }
}
