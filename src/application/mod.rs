pub mod use_cases;

pub use use_cases::column_resolver::{resolve_columns, ColumnResolver};
pub use use_cases::dataset_handle::DatasetHandle;
pub use use_cases::region_catalog::RegionCatalog;
