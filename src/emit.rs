//! Emission sinks. Units go out concurrently; each unit is written in one call
//! so its content never interleaves with another's. The first failure is
//! returned as is and nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::compose::OutputUnit;
use crate::error::EmissionError;

pub trait EmissionSink: Sync {
    fn emit(&self, unit: &OutputUnit) -> Result<(), EmissionError>;
}

pub fn emit_all(sink: &dyn EmissionSink, units: &[OutputUnit]) -> Result<(), EmissionError> {
    units.par_iter().try_for_each(|unit| sink.emit(unit))?;
    info!(units = units.len(), "emitted");
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// FILE SYSTEM
// ————————————————————————————————————————————————————————————————————————————

/// Writes `<root>/<package path>/<SubjectName>.java`.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    root: PathBuf,
}

impl FileSystemSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, unit: &OutputUnit) -> PathBuf {
        self.root.join(unit.relative_path())
    }
}

impl EmissionSink for FileSystemSink {
    fn emit(&self, unit: &OutputUnit) -> Result<(), EmissionError> {
        let path = self.path_for(unit);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| EmissionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, unit.source.as_bytes()).map_err(|source| EmissionError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "wrote unit");
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MEMORY
// ————————————————————————————————————————————————————————————————————————————

/// Keeps units keyed by qualified subject name. Emitting the same unit twice
/// is an error, matching a build that must not overwrite its own output.
#[derive(Debug, Default)]
pub struct MemorySink {
    units: Mutex<IndexMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, qualified_name: &str) -> Option<String> {
        self.units.lock().ok()?.get(qualified_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.units.lock().map(|u| u.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted by name so concurrent emission order does not leak out.
    pub fn into_sorted(self) -> Vec<(String, String)> {
        let units = self.units.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut out: Vec<_> = units.into_iter().collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl EmissionSink for MemorySink {
    fn emit(&self, unit: &OutputUnit) -> Result<(), EmissionError> {
        let mut units = self.units.lock().map_err(|_| EmissionError::Poisoned)?;
        let key = unit.qualified_name();
        if units.contains_key(&key) {
            return Err(EmissionError::Duplicate(key));
        }
        units.insert(key, unit.source.clone());
        Ok(())
    }
}
