use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DataValidationError, ValidationErrors};

/// 驗證報告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// 驗證器名稱
    pub validator_name: String,
    /// 開始時間
    pub start_time: DateTime<Utc>,
    /// 結束時間
    pub end_time: DateTime<Utc>,
    /// 總記錄數
    pub total_records: usize,
    /// 有效記錄數
    pub valid_records: usize,
    /// 無效記錄數
    pub invalid_records: usize,
    /// 錯誤摘要
    pub error_summary: ErrorSummary,
    /// 詳細錯誤（可選）
    pub detailed_errors: Option<Vec<DetailedError>>,
    /// 統計資訊
    pub statistics: BTreeMap<String, serde_json::Value>,
}

impl ValidationReport {
    /// 創建新的驗證報告
    pub fn new(validator_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            validator_name: validator_name.into(),
            start_time: now,
            end_time: now,
            total_records: 0,
            valid_records: 0,
            invalid_records: 0,
            error_summary: ErrorSummary::default(),
            detailed_errors: None,
            statistics: BTreeMap::new(),
        }
    }

    /// 完成報告
    pub fn finish(mut self) -> Self {
        self.end_time = Utc::now();
        self
    }

    /// 添加成功記錄
    pub fn add_success(&mut self) {
        self.total_records += 1;
        self.valid_records += 1;
    }

    /// 添加錯誤
    pub fn add_error(&mut self, line: usize, error: &DataValidationError) {
        self.total_records += 1;
        self.invalid_records += 1;
        self.error_summary.add_error(error);

        if let Some(ref mut errors) = self.detailed_errors {
            errors.push(DetailedError {
                line,
                error_type: error.kind().to_string(),
                message: error.to_string(),
            });
        }
    }

    /// 從錯誤集合創建報告
    pub fn from_errors(
        validator_name: impl Into<String>,
        total_records: usize,
        errors: &ValidationErrors,
    ) -> Self {
        let mut report = Self::new(validator_name).with_detailed_errors();
        for (line, error) in errors.iter() {
            report.add_error(*line, error);
        }
        report.total_records = total_records;
        report.valid_records = total_records.saturating_sub(errors.error_count());

        report.finish()
    }

    /// 啟用詳細錯誤記錄
    pub fn with_detailed_errors(mut self) -> Self {
        self.detailed_errors = Some(Vec::new());
        self
    }

    /// 添加統計資訊
    pub fn add_statistic(&mut self, key: impl Into<String>, value: impl Serialize) {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.statistics.insert(key.into(), json_value);
        }
    }

    /// 是否全部通過
    pub fn is_valid(&self) -> bool {
        self.invalid_records == 0
    }

    /// 獲取成功率
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            self.valid_records as f64 / self.total_records as f64
        }
    }

    /// 獲取處理時間（秒）
    pub fn processing_time(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}

/// 錯誤摘要
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// 各類型錯誤計數
    pub error_counts: BTreeMap<String, usize>,
    /// 最常見的錯誤
    pub top_errors: Vec<(String, usize)>,
}

impl ErrorSummary {
    /// 添加錯誤
    pub fn add_error(&mut self, error: &DataValidationError) {
        *self.error_counts.entry(error.kind().to_string()).or_insert(0) += 1;
        self.update_top_errors();
    }

    /// 更新最常見錯誤
    fn update_top_errors(&mut self) {
        let mut counts: Vec<(String, usize)> = self
            .error_counts
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.top_errors = counts.into_iter().take(5).collect();
    }
}

/// 詳細錯誤資訊
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedError {
    /// 行號
    pub line: usize,
    /// 錯誤類型
    pub error_type: String,
    /// 錯誤訊息
    pub message: String,
}

/// 報告格式化器
pub struct ReportFormatter;

impl ReportFormatter {
    /// 格式化為人類可讀的文字
    pub fn format_text(report: &ValidationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== 驗證報告: {} ===\n", report.validator_name));
        output.push_str(&format!(
            "開始時間: {}\n",
            report.start_time.format("%Y-%m-%d %H:%M:%S")
        ));
        output.push_str(&format!("處理時間: {:.2} 秒\n", report.processing_time()));
        output.push('\n');

        output.push_str("統計摘要:\n");
        output.push_str(&format!("  總記錄數: {}\n", report.total_records));
        output.push_str(&format!(
            "  有效記錄: {} ({:.2}%)\n",
            report.valid_records,
            report.success_rate() * 100.0
        ));
        output.push_str(&format!("  無效記錄: {}\n", report.invalid_records));
        output.push('\n');

        if !report.error_summary.top_errors.is_empty() {
            output.push_str("最常見的錯誤:\n");
            for (error_type, count) in &report.error_summary.top_errors {
                output.push_str(&format!("  {}: {} 次\n", error_type, count));
            }
            output.push('\n');
        }

        if let Some(errors) = &report.detailed_errors {
            if !errors.is_empty() {
                output.push_str("錯誤明細:\n");
                for error in errors {
                    output.push_str(&format!("  第 {} 行: {}\n", error.line, error.message));
                }
                output.push('\n');
            }
        }

        if !report.statistics.is_empty() {
            output.push_str("其他統計:\n");
            for (key, value) in &report.statistics {
                output.push_str(&format!("  {}: {}\n", key, value));
            }
        }

        output
    }

    /// 格式化為JSON
    pub fn format_json(report: &ValidationReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = ValidationReport::new("snapshot").with_detailed_errors();
        report.add_success();
        report.add_success();
        report.add_error(4, &DataValidationError::NullAsOfDate { portfolio: "A".into() });
        let report = report.finish();

        assert_eq!(report.total_records, 3);
        assert_eq!(report.valid_records, 2);
        assert!(!report.is_valid());
        assert!((report.success_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.error_summary.top_errors, vec![("NullAsOfDate".to_string(), 1)]);
        assert_eq!(report.detailed_errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_from_errors() {
        let mut errors = ValidationErrors::new();
        errors.add(2, DataValidationError::NullAsOfDate { portfolio: "A".into() });
        let report = ValidationReport::from_errors("snapshot", 5, &errors);
        assert_eq!(report.total_records, 5);
        assert_eq!(report.valid_records, 4);
        assert_eq!(report.invalid_records, 1);
    }

    #[test]
    fn test_format_text_and_json() {
        let mut report = ValidationReport::new("snapshot").with_detailed_errors();
        report.add_error(2, &DataValidationError::NullAsOfDate { portfolio: "B".into() });
        report.add_statistic("portfolio_count", 1);

        let text = ReportFormatter::format_text(&report);
        assert!(text.contains("=== 驗證報告: snapshot ==="));
        assert!(text.contains("第 2 行"));
        assert!(text.contains("portfolio_count: 1"));

        let json = ReportFormatter::format_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["statistics"]["portfolio_count"], 1);
        assert_eq!(value["invalid_records"], 1);
    }
}
