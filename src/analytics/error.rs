use thiserror::Error;

/// 分析模組錯誤
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("資料形狀不符: {0}")]
    ShapeMismatch(String),

    #[error("重複的代碼: {0}")]
    DuplicateTicker(String),

    #[error("日期必須嚴格遞增: {0}")]
    UnsortedDates(String),

    #[error("資料不足: 至少需要 {required} 筆觀測值，實際 {actual} 筆")]
    InsufficientData { required: usize, actual: usize },

    #[error("無效的門檻值: {0}（必須為有限正數）")]
    InvalidThreshold(f64),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
