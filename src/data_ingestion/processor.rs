pub mod csv_io;
pub mod data_loader;

pub use csv_io::{CsvReaderConfig, OutputFormat, PriceCsvReader, SnapshotCsvReader, SnapshotWriter};
pub use data_loader::{LoadedSnapshot, SnapshotLoader};
