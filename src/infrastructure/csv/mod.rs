// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Encoding fallback and delimited text parsing

mod tabular_loader;
mod text_encoding;

pub use tabular_loader::{LoadedDataset, TabularLoader};
pub use text_encoding::TextEncoding;
