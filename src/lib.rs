pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

mod app;

pub use app::run;
pub use application::{resolve_columns, ColumnResolver, DatasetHandle, RegionCatalog};
pub use domain::binding::{FieldBinding, Role, RoleCandidates};
pub use domain::dataset::Dataset;
pub use domain::error::{AppError, Result};
pub use domain::selection::Selection;
pub use infrastructure::assets::find_character_image;
pub use infrastructure::csv::{LoadedDataset, TabularLoader, TextEncoding};
