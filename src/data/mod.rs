//! Data module - CSV loading, enrichment and date filtering

pub mod loader;
pub mod processor;

pub use loader::{DataLoader, Dataset, LoaderError, Table};
pub use processor::{DataProcessor, DateRange, FilteredData, ReportError};
