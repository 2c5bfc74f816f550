use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::loader::{load_file, LoadError, LoadOptions};
use super::model::Dataset;

/// Identity of a source file as seen on disk. A change in size or
/// modification time means the file must be read again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
    options: LoadOptions,
}

/// Holds every dataset loaded during the process lifetime.
///
/// Datasets are handed out as `Arc<Dataset>`; they are never mutated, so
/// sessions can share them without locking.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<SourceKey, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reading it on first use or
    /// when the file changed on disk.
    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<Dataset>, LoadError> {
        let key = source_key(path, options)?;
        if let Some(dataset) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_file(path, options)?);
        log::info!(
            "Loaded {} rows x {} columns from {}",
            dataset.len(),
            dataset.n_columns(),
            path.display()
        );
        // Older versions of the same file are no longer reachable.
        self.entries.retain(|k, _| k.path != key.path);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of cached datasets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn source_key(path: &Path, options: &LoadOptions) -> Result<SourceKey, LoadError> {
    let canonical = std::fs::canonicalize(path).map_err(|e| io_error(path, e))?;
    let meta = std::fs::metadata(&canonical).map_err(|e| io_error(path, e))?;
    Ok(SourceKey {
        path: canonical,
        len: meta.len(),
        modified: meta.modified().ok(),
        options: options.clone(),
    })
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    if source.kind() == std::io::ErrorKind::NotFound {
        LoadError::Missing(path.to_path_buf())
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
