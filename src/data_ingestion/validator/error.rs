use chrono::NaiveDateTime;
use thiserror::Error;

/// 快照資料驗證錯誤
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataValidationError {
    #[error("缺失必要數據: {field}")]
    MissingData { field: String },

    #[error("基準日為空: 投資組合 {portfolio}")]
    NullAsOfDate { portfolio: String },

    #[error("數據值範圍錯誤: {field} = {value}, 允許範圍 [{min}, {max}]")]
    RangeError {
        field: String,
        value: NaiveDateTime,
        min: String,
        max: String,
    },
}

impl DataValidationError {
    /// 錯誤類型名稱（報告彙總用）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingData { .. } => "MissingData",
            Self::NullAsOfDate { .. } => "NullAsOfDate",
            Self::RangeError { .. } => "RangeError",
        }
    }
}

/// 依行號收集的驗證錯誤
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(usize, DataValidationError)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, line: usize, error: DataValidationError) {
        self.errors.push((line, error));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(usize, DataValidationError)> {
        self.errors.iter()
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "共 {} 個驗證錯誤", self.errors.len())?;
        if let Some((line, first)) = self.errors.first() {
            write!(f, "，第一個在第 {} 行: {}", line, first)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub type ValidationResult<T> = Result<T, DataValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add(3, DataValidationError::NullAsOfDate { portfolio: "A".into() });
        let mut more = ValidationErrors::new();
        more.add(
            7,
            DataValidationError::MissingData {
                field: "portfolio".into(),
            },
        );
        errors.merge(more);

        assert_eq!(errors.error_count(), 2);
        assert_eq!(errors.iter().map(|(l, _)| *l).collect::<Vec<_>>(), vec![3, 7]);
        assert!(errors.to_string().contains("第 3 行"));
    }

    #[test]
    fn test_error_kind() {
        let e = DataValidationError::NullAsOfDate { portfolio: "A".into() };
        assert_eq!(e.kind(), "NullAsOfDate");
    }
}
