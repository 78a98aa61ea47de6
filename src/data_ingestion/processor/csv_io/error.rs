//! CSV 處理錯誤定義

use thiserror::Error;

use crate::analytics::AnalyticsError;
use crate::domain_types::SchemaError;

/// CSV 處理錯誤類型
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("檔案讀取錯誤: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV 解析錯誤: {0}")]
    ParseError(#[from] csv::Error),

    #[error("資料表結構錯誤: {0}")]
    Schema(#[from] SchemaError),

    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("第 {line} 行資料無效: {reason}")]
    InvalidRow { line: u64, reason: SchemaError },

    #[error("無效的欄位格式: 第 {line} 行, 欄位 {column}, 值 {value}, 原因: {reason}")]
    InvalidFormat {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("JSON 輸出錯誤: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("價格表錯誤: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("不支援的輸出格式: {0}")]
    UnsupportedFormat(String),
}

/// CSV 處理結果類型
pub type CsvResult<T> = Result<T, CsvError>;
