pub mod column_resolver;
pub mod dataset_handle;
pub mod region_catalog;
