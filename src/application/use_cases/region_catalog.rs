// ============================================================
// REGION CATALOG
// ============================================================
// Loaded dataset plus its field binding, the unit the handle caches

use tracing::warn;

use crate::application::use_cases::column_resolver::resolve_columns;
use crate::domain::binding::{FieldBinding, RoleCandidates};
use crate::domain::dataset::Dataset;
use crate::domain::error::{AppError, Result};
use crate::domain::selection::Selection;
use crate::infrastructure::csv::{LoadedDataset, TextEncoding};

#[derive(Debug, Clone)]
pub struct RegionCatalog {
    loaded: LoadedDataset,
    binding: Option<FieldBinding>,
    placeholder: String,
}

impl RegionCatalog {
    /// Resolve the binding for `loaded` once and keep both together
    pub fn new(loaded: LoadedDataset, candidates: &RoleCandidates, placeholder: &str) -> Self {
        let binding = resolve_columns(loaded.dataset.columns(), candidates);
        if binding.is_none() {
            warn!("Dataset has no columns; no roles can be bound");
        }

        Self {
            loaded,
            binding,
            placeholder: placeholder.to_string(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.loaded.dataset
    }

    /// Encoding the file was read with, `None` if it was unreadable
    pub fn encoding(&self) -> Option<TextEncoding> {
        self.loaded.encoding
    }

    pub fn binding(&self) -> Option<&FieldBinding> {
        self.binding.as_ref()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn is_available(&self) -> bool {
        !self.loaded.dataset.is_empty() && self.binding.is_some()
    }

    /// The binding, or `DatasetUnavailable` when there is nothing to show
    pub fn ensure_available(&self) -> Result<&FieldBinding> {
        if self.loaded.dataset.is_empty() {
            let reason = if self.loaded.is_readable() {
                "the data file has no rows"
            } else {
                "the data file could not be read in any supported encoding"
            };
            return Err(AppError::DatasetUnavailable(reason.to_string()));
        }

        self.binding
            .as_ref()
            .ok_or_else(|| AppError::DatasetUnavailable("the data file has no columns".to_string()))
    }

    /// Distinct region values in row order
    pub fn regions(&self) -> Result<Vec<String>> {
        let binding = self.ensure_available()?;
        Ok(self.loaded.dataset.distinct_values(&binding.region.column))
    }

    /// Profile of the first row whose region equals `region`
    pub fn select(&self, region: &str) -> Result<Selection> {
        let binding = self.ensure_available()?;
        let row = self
            .loaded
            .dataset
            .find_row(&binding.region.column, region)
            .ok_or_else(|| AppError::NotFound(format!("Region '{}'", region.trim())))?;

        Ok(Selection::from_row(&row, binding, &self.placeholder))
    }
}
