use std::sync::{Arc, Mutex, PoisonError, RwLock};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{LoadError, QueryError};
use crate::query::RecommendationQuery;
use crate::report::RecommendationReport;
use crate::similarity;
use crate::source::{CsvDirSource, TableSource};

static SHARED: OnceCell<DatasetStore> = OnceCell::new();

/// Process-wide store over the configured CSV directory.
pub fn shared_store() -> Result<&'static DatasetStore> {
    SHARED.get_or_try_init(|| {
        let config = Config::from_env();
        if !config.data_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "data directory {} does not exist",
                config.data_dir.display()
            ));
        }
        Ok(DatasetStore::new(CsvDirSource::new(config.data_dir)))
    })
    .context("failed to initialise dataset store")
}

/// Owns the loaded dataset. Starts unloaded; a failed load leaves it unloaded
/// and the next trigger retries. At most one load runs at a time.
pub struct DatasetStore {
    source: Box<dyn TableSource>,
    loaded: RwLock<Option<Arc<Dataset>>>,
    load_lock: Mutex<()>,
}

impl DatasetStore {
    pub fn new(source: impl TableSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            loaded: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset().is_some()
    }

    /// The current dataset, without triggering a load.
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read every table again and replace the current dataset.
    pub fn load(&self) -> Result<Arc<Dataset>, LoadError> {
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked()
    }

    /// Load unless already loaded. Concurrent callers wait on the one load in
    /// flight and then share its outcome.
    pub fn ensure_loaded(&self) -> Result<Arc<Dataset>, LoadError> {
        if let Some(dataset) = self.dataset() {
            return Ok(dataset);
        }
        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = self.dataset() {
            return Ok(dataset);
        }
        self.load_locked()
    }

    fn load_locked(&self) -> Result<Arc<Dataset>, LoadError> {
        match Dataset::load(self.source.as_ref()) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                *self.loaded.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(Arc::clone(&dataset));
                info!(roles = dataset.role_features().len(), "dataset store ready");
                Ok(dataset)
            }
            Err(err) => {
                *self.loaded.write().unwrap_or_else(PoisonError::into_inner) = None;
                warn!(error = %err, "dataset load failed");
                Err(err)
            }
        }
    }

    /// Sorted club names across all four tables, loading first if needed.
    pub fn list_clubs(&self) -> Result<Vec<String>, LoadError> {
        Ok(self.ensure_loaded()?.clubs())
    }

    pub fn recommend(&self, query: &RecommendationQuery) -> Result<RecommendationReport, QueryError> {
        let dataset = self.ensure_loaded()?;
        let ranking = similarity::recommend(&dataset, &query.club, query.role, query.top_k)?;
        Ok(RecommendationReport::from_ranking(&ranking))
    }
}
