//! 快照 CSV 檔案讀取器

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use super::error::{CsvError, CsvResult};
use crate::domain_types::{ColumnName, SchemaError, SnapshotSchema, SnapshotTable};
use crate::utils::time_utils::AsOfParser;

/// CSV 讀取器配置
#[derive(Debug, Clone)]
pub struct CsvReaderConfig {
    /// 分隔符
    pub delimiter: u8,
    /// 投資組合欄位名稱
    pub portfolio_column: String,
    /// 基準日欄位名稱
    pub as_of_column: String,
    /// as_of_date 格式（空列表使用預設格式）
    pub date_formats: Vec<String>,
}

impl Default for CsvReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            portfolio_column: ColumnName::PORTFOLIO.to_string(),
            as_of_column: ColumnName::AS_OF_DATE.to_string(),
            date_formats: Vec::new(),
        }
    }
}

/// 快照 CSV 讀取器
///
/// 第一行必須是標題列；欄位值以原始文字保存。
#[derive(Debug, Clone, Default)]
pub struct SnapshotCsvReader {
    config: CsvReaderConfig,
}

impl SnapshotCsvReader {
    /// 創建新的 CSV 讀取器
    pub fn new(config: CsvReaderConfig) -> Self {
        Self { config }
    }

    /// 設定分隔符
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// 設定鍵欄位名稱
    pub fn with_key_columns(mut self, portfolio: impl Into<String>, as_of: impl Into<String>) -> Self {
        self.config.portfolio_column = portfolio.into();
        self.config.as_of_column = as_of.into();
        self
    }

    /// 設定日期格式
    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.config.date_formats = formats;
        self
    }

    pub fn config(&self) -> &CsvReaderConfig {
        &self.config
    }

    /// 從檔案路徑讀取 CSV
    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> CsvResult<SnapshotTable> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CsvError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("檔案不存在: {}", path.display()),
            )));
        }

        debug!("讀取快照檔案: {}", path.display());
        let file = std::fs::File::open(path)?;
        self.read_from(file)
    }

    /// 從字串讀取 CSV
    pub fn read_string(&self, data: &str) -> CsvResult<SnapshotTable> {
        self.read_from(data.as_bytes())
    }

    /// 從任意來源讀取 CSV
    pub fn read_from<R: Read>(&self, source: R) -> CsvResult<SnapshotTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        // 結構在讀取任何資料列之前驗證
        let schema = SnapshotSchema::new(
            headers,
            &self.config.portfolio_column,
            &self.config.as_of_column,
        )
        .map_err(|e| match e {
            SchemaError::MissingColumn(c) => CsvError::MissingColumn(c),
            other => CsvError::Schema(other),
        })?;

        let parser = AsOfParser::with_formats(self.config.date_formats.clone());
        let as_of_index = schema.as_of_index();
        let mut table = SnapshotTable::new(schema);
        let mut record = StringRecord::new();

        while reader.read_record(&mut record)? {
            let position = record.position().map(|p| p.line());
            let line = position.unwrap_or(0);
            let values: Vec<String> = record.iter().map(str::to_string).collect();

            table.push_row_at(values, position, &parser).map_err(|reason| match reason {
                SchemaError::InvalidDate(e) => CsvError::InvalidFormat {
                    line,
                    column: self.config.as_of_column.clone(),
                    value: record.get(as_of_index).unwrap_or_default().to_string(),
                    reason: e.to_string(),
                },
                other => CsvError::InvalidRow { line, reason: other },
            })?;
        }

        debug!("讀取完成: {} 列，{} 欄", table.len(), table.schema().width());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_reader_config_default() {
        let config = CsvReaderConfig::default();
        assert_eq!(config.delimiter, b',');
        assert_eq!(config.portfolio_column, "portfolio");
        assert_eq!(config.as_of_column, "as_of_date");
        assert!(config.date_formats.is_empty());
    }

    #[test]
    fn test_read_csv_string() {
        let csv_data = "portfolio,as_of_date,holding\n\
                        A,2023-01-01,x1\n\
                        A,2023-02-01,x2\n\
                        B,2023-01-15,y1\n";

        let table = SnapshotCsvReader::default().read_string(csv_data).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.schema().columns(), &["portfolio", "as_of_date", "holding"]);
        assert_eq!(table.records()[2].portfolio, "B");
    }

    #[test]
    fn test_read_csv_with_custom_separator_and_keys() {
        let csv_data = "fund;snapshot;qty\nF1;2023/03/31;10\n";

        let table = SnapshotCsvReader::default()
            .with_delimiter(b';')
            .with_key_columns("fund", "snapshot")
            .read_string(csv_data)
            .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.schema().portfolio_column(), "fund");
        assert!(table.records()[0].as_of_date.is_some());
    }

    #[test]
    fn test_missing_key_column_fails_before_rows() {
        let csv_data = "portfolio,holding\nA,x\n";
        let err = SnapshotCsvReader::default().read_string(csv_data).unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(c) if c == "as_of_date"));
    }

    #[test]
    fn test_same_key_columns_rejected() {
        let err = SnapshotCsvReader::default()
            .with_key_columns("portfolio", "portfolio")
            .read_string("portfolio,as_of_date\nA,2023-01-01\n")
            .unwrap_err();
        assert!(matches!(err, CsvError::Schema(SchemaError::SameKeyColumn(c)) if c == "portfolio"));
    }

    #[test]
    fn test_empty_input_is_missing_columns() {
        let err = SnapshotCsvReader::default().read_string("").unwrap_err();
        assert!(matches!(err, CsvError::MissingColumn(_)));
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = SnapshotCsvReader::default()
            .read_string("portfolio,as_of_date\n")
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_invalid_date_reports_line() {
        let csv_data = "portfolio,as_of_date\nA,2023-01-01\nB,yesterday\n";
        let err = SnapshotCsvReader::default().read_string(csv_data).unwrap_err();
        match err {
            CsvError::InvalidFormat { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "as_of_date");
                assert_eq!(value, "yesterday");
            }
            other => panic!("Expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_records_keep_source_line() {
        let csv_data = "portfolio,as_of_date,note\nA,2023-01-01,\"two\nlines\"\nB,2023-01-02,x\n";
        let table = SnapshotCsvReader::default().read_string(csv_data).unwrap();
        let lines: Vec<Option<u64>> = table.records().iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![Some(2), Some(4)]);
    }

    #[test]
    fn test_ragged_row() {
        let csv_data = "portfolio,as_of_date,holding\nA,2023-01-01\n";
        let err = SnapshotCsvReader::default().read_string(csv_data).unwrap_err();
        assert!(matches!(
            err,
            CsvError::InvalidRow { line: 2, reason: SchemaError::WidthMismatch { expected: 3, actual: 2 } }
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let err = SnapshotCsvReader::default()
            .read_file("/nonexistent/snapshots.csv")
            .unwrap_err();
        assert!(matches!(err, CsvError::IoError(_)));
    }
}
