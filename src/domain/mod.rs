pub mod binding;
pub mod config;
pub mod dataset;
pub mod error;
pub mod selection;
