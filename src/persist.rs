use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::debug;

use crate::model::Building;
use crate::registry::StoreError;

/// Where the registry loads its dataset from and writes it back to.
///
/// `save` always receives the complete building collection; implementations
/// replace whatever they held before.
pub trait Backend {
    fn load(&self) -> Result<Vec<Building>, StoreError>;
    fn save(&mut self, buildings: &[Building]) -> Result<(), StoreError>;
}

/// Whole-dataset JSON file.
///
/// A missing or empty file loads as an empty dataset. Saves go to a sibling
/// `.tmp` file which is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_and_swap(&self, tmp_path: &Path, buildings: &[Building]) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(tmp_path)?);
        write_json(&mut writer, buildings)?;
        writer.get_ref().sync_all()?;
        drop(writer);
        fs::rename(tmp_path, &self.path)
    }
}

/// Errors from the writer surface as I/O, never as a malformed document.
fn write_json(writer: &mut impl Write, buildings: &[Building]) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, buildings).map_err(io::Error::from)?;
    writer.flush()
}

impl Backend for JsonFile {
    fn load(&self) -> Result<Vec<Building>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&mut self, buildings: &[Building]) -> Result<(), StoreError> {
        let started = Instant::now();
        let tmp_path = self.tmp_path();
        if let Err(e) = self.write_and_swap(&tmp_path, buildings) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        let elapsed = started.elapsed();
        metrics::histogram!(crate::observability::PERSIST_DURATION_SECONDS)
            .record(elapsed.as_secs_f64());
        debug!(path = %self.path.display(), buildings = buildings.len(), ?elapsed, "data file written");
        Ok(())
    }
}

/// Keeps the last saved snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    snapshot: Vec<Building>,
    saves: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing dataset, as if it had been loaded from disk.
    pub fn with_buildings(buildings: Vec<Building>) -> Self {
        Self { snapshot: buildings, saves: 0 }
    }

    pub fn snapshot(&self) -> &[Building] {
        &self.snapshot
    }

    /// Number of completed saves.
    pub fn saves(&self) -> u64 {
        self.saves
    }
}

impl Backend for MemoryBackend {
    fn load(&self) -> Result<Vec<Building>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, buildings: &[Building]) -> Result<(), StoreError> {
        self.snapshot = buildings.to_vec();
        self.saves += 1;
        Ok(())
    }
}
