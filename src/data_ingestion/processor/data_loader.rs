use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use super::csv_io::{CsvReaderConfig, SnapshotCsvReader};
use crate::data_ingestion::validator::{SnapshotValidator, ValidationReport};
use crate::domain_types::{NullDatePolicy, SnapshotTable};

/// 已載入並驗證的快照
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub table: SnapshotTable,
    pub report: ValidationReport,
}

/// 快照載入器：讀取 CSV 後執行驗證
#[derive(Debug, Clone, Default)]
pub struct SnapshotLoader {
    reader: SnapshotCsvReader,
    validator: SnapshotValidator,
}

impl SnapshotLoader {
    pub fn new(config: CsvReaderConfig, null_dates: NullDatePolicy) -> Self {
        Self {
            reader: SnapshotCsvReader::new(config),
            validator: SnapshotValidator::new(null_dates),
        }
    }

    pub fn with_validator(mut self, validator: SnapshotValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn reader(&self) -> &SnapshotCsvReader {
        &self.reader
    }

    /// 載入快照並產生驗證報告（驗證失敗不中斷）
    pub fn load(&self, file_path: impl AsRef<Path>) -> Result<LoadedSnapshot> {
        let file_path = file_path.as_ref();
        let table = self
            .reader
            .read_file(file_path)
            .with_context(|| format!("從CSV導入快照失敗: {}", file_path.display()))?;

        let report = self.validator.validate(&table);
        if report.is_valid() {
            info!(
                "載入 {} 列快照，{} 個投資組合",
                table.len(),
                table.portfolios().len()
            );
        } else {
            warn!(
                "快照驗證發現 {} 筆無效記錄 ({})",
                report.invalid_records,
                file_path.display()
            );
        }

        Ok(LoadedSnapshot { table, report })
    }

    /// 載入快照，有任何無效記錄即回傳錯誤
    pub fn load_validated(&self, file_path: impl AsRef<Path>) -> Result<SnapshotTable> {
        let loaded = self.load(file_path)?;
        if let Some(first) = loaded.report.detailed_errors.as_ref().and_then(|e| e.first()) {
            bail!(
                "數據驗證錯誤: {} 筆無效記錄，第 {} 行: {}",
                loaded.report.invalid_records,
                first.line,
                first.message
            );
        }
        Ok(loaded.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_with_report() {
        let file = write_csv("portfolio,as_of_date,holding\nA,2023-01-01,x\nA,,y\n");
        let loaded = SnapshotLoader::default().load(file.path()).unwrap();

        assert_eq!(loaded.table.len(), 2);
        assert!(loaded.report.is_valid());
        assert_eq!(loaded.report.statistics["null_date_count"], 1);
    }

    #[test]
    fn test_load_validated_rejects_null_dates() {
        let file = write_csv("portfolio,as_of_date\nA,2023-01-01\nB,\n");
        let loader = SnapshotLoader::new(CsvReaderConfig::default(), NullDatePolicy::Reject);

        let err = loader.load_validated(file.path()).unwrap_err();
        assert!(err.to_string().contains("第 3 行"));
    }

    #[test]
    fn test_custom_validator_date_range() {
        let file = write_csv("portfolio,as_of_date\nA,2019-12-31\nA,2023-01-01\n");
        let min = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let loader = SnapshotLoader::default()
            .with_validator(SnapshotValidator::default().with_date_range(Some(min), None));

        let loaded = loader.load(file.path()).unwrap();
        assert_eq!(loaded.report.invalid_records, 1);
        assert!(loader.load_validated(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = SnapshotLoader::default().load("/nonexistent/file.csv").unwrap_err();
        assert!(err.to_string().contains("從CSV導入快照失敗"));
    }
}
