use serde::{Deserialize, Serialize};

use crate::config::validation::{ValidationError, ValidationUtils, Validator};
use crate::domain_types::{ColumnName, Engine, NullDatePolicy, QueryStyle, SelectionPolicy, TieBreak};
use crate::selector::SelectorOptions;

/// 應用程序配置
///
/// 每個區段都有預設值，配置文件與環境變數只需覆寫差異。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log: LogConfig,
    pub selection: SelectionConfig,
    pub csv: CsvConfig,
    pub sql: SqlConfig,
    pub analytics: AnalyticsConfig,
}

impl Validator for ApplicationConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        self.log.validate()?;
        self.selection.validate()?;
        self.csv.validate()?;
        self.sql.validate()?;
        self.analytics.validate()?;

        Ok(())
    }
}

/// 日誌配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
    /// 每日輪替日誌檔的目錄（不設定則只輸出到 stderr）
    pub file_dir: Option<String>,
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_dir: None,
            file_prefix: "latest_snapshot".to_string(),
        }
    }
}

impl Validator for LogConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // 驗證日誌級別
        ValidationUtils::one_of(
            &self.level.to_lowercase().as_str(),
            &["trace", "debug", "info", "warn", "error"],
            "log.level",
        )?;

        // 驗證日誌格式
        ValidationUtils::one_of(
            &self.format.to_lowercase().as_str(),
            &["pretty", "compact", "json"],
            "log.format",
        )?;

        ValidationUtils::check_dependency(
            self.file_dir.is_some(),
            !self.file_prefix.trim().is_empty(),
            "log.file_dir",
            "log.file_prefix",
        )?;

        Ok(())
    }
}

/// 選取配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub policy: SelectionPolicy,
    pub null_dates: NullDatePolicy,
    /// Strict 同日並列時的次要排序欄位（不設定則依輸入順序）
    pub tie_break_column: Option<String>,
    pub engine: Engine,
}

impl SelectionConfig {
    /// 轉換為選取選項
    pub fn options(&self) -> SelectorOptions {
        SelectorOptions::new(self.policy)
            .with_null_dates(self.null_dates)
            .with_tie_break(TieBreak::from_column(self.tie_break_column.as_deref()))
    }
}

impl Validator for SelectionConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(column) = &self.tie_break_column {
            ValidationUtils::not_empty(column, "selection.tie_break_column")?;
        }
        Ok(())
    }
}

/// CSV 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: String,
    pub portfolio_column: String,
    pub as_of_column: String,
    pub date_formats: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            portfolio_column: ColumnName::PORTFOLIO.to_string(),
            as_of_column: ColumnName::AS_OF_DATE.to_string(),
            date_formats: Vec::new(),
        }
    }
}

impl CsvConfig {
    /// 分隔符位元組（驗證後保證為單一 ASCII 字元）
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }
}

impl Validator for CsvConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::single_ascii_char(&self.delimiter, "csv.delimiter")?;
        ValidationUtils::not_empty(&self.portfolio_column, "csv.portfolio_column")?;
        ValidationUtils::not_empty(&self.as_of_column, "csv.as_of_column")?;

        if self.portfolio_column == self.as_of_column {
            return Err(ValidationError::InvalidValue(format!(
                "csv.portfolio_column 與 csv.as_of_column 不可相同: {}",
                self.as_of_column
            )));
        }
        Ok(())
    }
}

/// SQL 產生配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub table: String,
    /// 代表輸入順序的欄位，Strict 並列時作為次要排序
    pub row_id_column: Option<String>,
    pub style: QueryStyle,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            table: "portfolio_snapshots".to_string(),
            row_id_column: None,
            style: QueryStyle::default(),
        }
    }
}

impl Validator for SqlConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::not_empty(&self.table, "sql.table")?;
        if let Some(column) = &self.row_id_column {
            ValidationUtils::not_empty(column, "sql.row_id_column")?;
        }
        Ok(())
    }
}

/// 分析配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub gerber_threshold: f64,
    /// 價格檔的日期欄位
    pub date_column: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            gerber_threshold: 0.5,
            date_column: "date".to_string(),
        }
    }
}

impl Validator for AnalyticsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        ValidationUtils::in_range(self.gerber_threshold, 0.01, 10.0, "analytics.gerber_threshold")?;
        ValidationUtils::not_empty(&self.date_column, "analytics.date_column")?;
        Ok(())
    }
}
