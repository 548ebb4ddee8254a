use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::application::use_cases::region_catalog::RegionCatalog;
use crate::domain::binding::RoleCandidates;
use crate::domain::config::AppConfig;
use crate::infrastructure::csv::TabularLoader;

/// Once-initialized access to the region catalog.
///
/// The first `get` loads and resolves the data file; later calls share the
/// same catalog. `reload` needs exclusive access and replaces it.
pub struct DatasetHandle {
    path: PathBuf,
    loader: TabularLoader,
    candidates: RoleCandidates,
    placeholder: String,
    catalog: OnceCell<Arc<RegionCatalog>>,
}

impl DatasetHandle {
    pub fn new(
        path: impl Into<PathBuf>,
        loader: TabularLoader,
        candidates: RoleCandidates,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            loader,
            candidates,
            placeholder: placeholder.into(),
            catalog: OnceCell::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let loader = match config.delimiter_byte() {
            Some(delimiter) => TabularLoader::new().with_delimiter(delimiter),
            None => TabularLoader::new(),
        };
        Self::new(
            config.data_path.clone(),
            loader,
            config.candidates.clone(),
            config.placeholder.clone(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.get().is_some()
    }

    pub fn get(&self) -> Arc<RegionCatalog> {
        self.catalog.get_or_init(|| Arc::new(self.load())).clone()
    }

    /// Drop the cached catalog and load the file again
    pub fn reload(&mut self) -> Arc<RegionCatalog> {
        self.catalog.take();
        info!(path = %self.path.display(), "Reloading dataset");
        self.get()
    }

    fn load(&self) -> RegionCatalog {
        let loaded = self.loader.load(&self.path);
        RegionCatalog::new(loaded, &self.candidates, &self.placeholder)
    }
}
