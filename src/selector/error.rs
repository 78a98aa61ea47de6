//! 選取器錯誤定義

use thiserror::Error;

use crate::domain_types::SchemaError;

/// 選取器錯誤類型
#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("資料表結構錯誤: {0}")]
    Schema(#[from] SchemaError),

    #[error("第 {row} 列（投資組合 {portfolio}）的 as_of_date 為空，目前策略不接受空值")]
    NullAsOfDate { row: usize, portfolio: String },

    #[error("未知的欄位: {0}")]
    UnknownColumn(String),

    #[error("無效的 SQL 識別字: {0:?}")]
    InvalidIdentifier(String),

    #[error("不支援的操作: {0}")]
    Unsupported(String),

    #[error("Polars 錯誤: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// 選取器結果類型
pub type SelectorResult<T> = Result<T, SelectorError>;
