use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::LoadError;
use super::loader::{load_file, LoadOptions};
use super::model::Dataset;

// ---------------------------------------------------------------------------
// DatasetCache – load each source once per process
// ---------------------------------------------------------------------------

/// Memoizes [`load_file`] by source path.
///
/// Sources are assumed static for the lifetime of the cache, so entries are
/// never invalidated implicitly. Failed loads are not cached and will be
/// retried on the next call.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: HashMap<PathBuf, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Return the cached dataset for `path`, loading it on first access.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let key = source_key(path);
        if let Some(dataset) = self.entries.get(&key) {
            log::debug!("Dataset cache hit for {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_file(path, &self.options)?);
        self.entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&source_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached dataset.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Canonical path when it resolves, so `./a.csv` and `a.csv` share an entry.
fn source_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const CSV: &str = "date,price,city,bedrooms,bathrooms,sqft_living,sqft_lot,floors,condition,waterfront,yr_built\n\
        2014-05-02,500000,Seattle,3,2,1800,5000,1,3,0,1960\n\
        2014-05-03,250000,Renton,2,1,1100,6000,1,4,0,1972\n";

    #[test]
    fn second_load_is_served_from_memory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("houses.csv");
        fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&path).unwrap();

        // The source is gone; a re-read would fail.
        fs::remove_file(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn equivalent_paths_share_an_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("houses.csv");
        fs::write(&path, CSV).unwrap();
        let dotted = dir.path().join(".").join("houses.csv");

        let mut cache = DatasetCache::default();
        let a = cache.get_or_load(&path).unwrap();
        let b = cache.get_or_load(&dotted).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn failures_are_not_cached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("later.csv");

        let mut cache = DatasetCache::default();
        assert!(matches!(
            cache.get_or_load(&path),
            Err(LoadError::SourceNotFound(_))
        ));
        assert!(!cache.contains(&path));

        fs::write(&path, CSV).unwrap();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 2);
        assert!(cache.contains(&path));
    }

    #[test]
    fn clear_forgets_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("houses.csv");
        fs::write(&path, CSV).unwrap();

        let mut cache = DatasetCache::new(LoadOptions::default());
        cache.get_or_load(&path).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
