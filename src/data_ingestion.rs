pub mod processor;
pub mod validator;

pub use processor::{
    CsvReaderConfig, LoadedSnapshot, OutputFormat, PriceCsvReader, SnapshotCsvReader, SnapshotLoader,
    SnapshotWriter,
};
