//! Data module - CSV loading and cleaning

pub mod frame;
pub mod imputer;
mod loader;
mod processor;
pub mod runtime;
pub mod schema;
pub mod table;

pub use loader::DataLoader;
pub use processor::{CleanOptions, Cleaned, DataProcessor};
pub use table::{Column, ColumnData, DataType, KeyValue, Table, Value};
