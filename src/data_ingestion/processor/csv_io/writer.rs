//! 快照輸出（CSV / JSON）

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{CsvError, CsvResult};
use crate::domain_types::SnapshotTable;

/// 輸出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(CsvError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// 快照寫出器
///
/// CSV 保留原始標題與儲存格文字；JSON 為物件陣列。
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    format: OutputFormat,
    delimiter: u8,
}

impl Default for SnapshotWriter {
    fn default() -> Self {
        Self {
            format: OutputFormat::Csv,
            delimiter: b',',
        }
    }
}

impl SnapshotWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// 寫入任意輸出
    pub fn write<W: Write>(&self, table: &SnapshotTable, mut out: W) -> CsvResult<()> {
        match self.format {
            OutputFormat::Csv => {
                let mut writer = WriterBuilder::new().delimiter(self.delimiter).from_writer(out);
                writer.write_record(table.schema().columns())?;
                for record in table.records() {
                    writer.write_record(&record.values)?;
                }
                writer.flush()?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &table.to_json_rows())?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// 寫入檔案
    pub fn write_file<P: AsRef<Path>>(&self, table: &SnapshotTable, path: P) -> CsvResult<()> {
        let path = path.as_ref();
        debug!("寫出 {} 列至 {} ({})", table.len(), path.display(), self.format);
        let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write(table, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// 輸出為字串
    pub fn to_string(&self, table: &SnapshotTable) -> CsvResult<String> {
        let mut buffer = Vec::new();
        self.write(table, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| CsvError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SnapshotTable {
        SnapshotTable::from_rows(
            ["portfolio", "as_of_date", "holding"],
            vec![vec!["A", "2023-02-01", "x, y"], vec!["B", "", "z"]],
        )
        .unwrap()
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!("xml".parse::<OutputFormat>(), Err(CsvError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_write_csv_keeps_cell_text() {
        let out = SnapshotWriter::default().to_string(&sample()).unwrap();
        assert_eq!(
            out,
            "portfolio,as_of_date,holding\nA,2023-02-01,\"x, y\"\nB,,z\n"
        );
    }

    #[test]
    fn test_write_csv_custom_delimiter() {
        let out = SnapshotWriter::default().with_delimiter(b';').to_string(&sample()).unwrap();
        assert!(out.starts_with("portfolio;as_of_date;holding\n"));
    }

    #[test]
    fn test_write_json() {
        let out = SnapshotWriter::new(OutputFormat::Json).to_string(&sample()).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(rows[0]["holding"], "x, y");
        assert!(rows[1]["as_of_date"].is_null());
    }

    #[test]
    fn test_write_empty_table_has_header() {
        let table = SnapshotTable::from_rows(["portfolio", "as_of_date"], Vec::<Vec<&str>>::new()).unwrap();
        let out = SnapshotWriter::default().to_string(&table).unwrap();
        assert_eq!(out, "portfolio,as_of_date\n");
    }
}
