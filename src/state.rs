use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::{apply, Bounds, Dataset, DatasetCache, FilterCriteria, FilteredView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: DatasetCache,

    /// Path of the dataset currently shown.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// Current filter selection.
    pub criteria: FilterCriteria,

    /// Result of the last pipeline run; None whenever there is nothing to show.
    pub view: Option<FilteredView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the record table is expanded.
    pub show_records: bool,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            cache: DatasetCache::new(config.load),
            config,
            source: None,
            dataset: None,
            criteria: FilterCriteria::new(Bounds::new(0.0, 0.0)),
            view: None,
            status_message: None,
            show_records: false,
        }
    }

    /// Load (or fetch from cache) `path` and make it the active dataset.
    /// On failure whatever was shown before stays in place and the error is
    /// kept in `status_message`.
    pub fn open(&mut self, path: &Path) -> bool {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                self.set_dataset(path, dataset);
                true
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                false
            }
        }
    }

    /// Ingest a loaded dataset and start from the configured default filters.
    pub fn set_dataset(&mut self, path: &Path, dataset: Arc<Dataset>) {
        self.criteria = FilterCriteria::initial(
            &dataset,
            &self.config.default_cities,
            self.config.price_ceiling_ratio,
        );
        self.source = Some(path.to_path_buf());
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the view after a criteria change.
    pub fn refilter(&mut self) {
        match apply(self.dataset.as_deref(), &self.criteria, &self.config.view) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                log::warn!("Cannot compute view: {e}");
                self.view = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Toggle a single city in the allow-list.
    pub fn toggle_city(&mut self, city: &str) {
        if !self.criteria.cities.remove(city) {
            self.criteria.cities.insert(city.to_string());
        }
        self.refilter();
    }

    /// Tick every city of the dataset explicitly.
    pub fn select_all_cities(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria.cities = ds.cities().clone();
            self.refilter();
        }
    }

    /// Untick every city, which lifts the city restriction entirely.
    pub fn clear_cities(&mut self) {
        self.criteria.cities.clear();
        self.refilter();
    }

    pub fn set_price_range(&mut self, min: f64, max: f64) {
        self.criteria.price = Bounds::new(min, max);
        self.refilter();
    }

    pub fn set_bedrooms(&mut self, bedrooms: Option<Bounds<u32>>) {
        self.criteria.bedrooms = bedrooms;
        self.refilter();
    }

    pub fn cached_sources(&self) -> usize {
        self.cache.len()
    }
}
