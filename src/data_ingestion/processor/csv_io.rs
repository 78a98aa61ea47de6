//! CSV 檔案讀取與處理模組

pub mod error;
pub mod prices;
pub mod reader;
pub mod writer;

pub use error::{CsvError, CsvResult};
pub use prices::PriceCsvReader;
pub use reader::{CsvReaderConfig, SnapshotCsvReader};
pub use writer::{OutputFormat, SnapshotWriter};
