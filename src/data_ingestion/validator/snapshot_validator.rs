use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use super::error::{DataValidationError, ValidationResult};
use super::report::ValidationReport;
use super::traits::DataValidator;
use crate::domain_types::{ColumnName, NullDatePolicy, SnapshotRecord, SnapshotTable};

/// 快照驗證器
///
/// 檢查投資組合欄位、空基準日（依空值策略）與可選的日期範圍。
#[derive(Debug, Clone, Default)]
pub struct SnapshotValidator {
    null_dates: NullDatePolicy,
    min_date: Option<NaiveDateTime>,
    max_date: Option<NaiveDateTime>,
}

/// 快照統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotStats {
    pub portfolio_count: usize,
    pub null_date_count: usize,
    /// 最新日期有多列的投資組合（Strict 與 AllAtMax 結果不同之處）
    pub tied_portfolios: Vec<String>,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
}

impl SnapshotValidator {
    pub fn new(null_dates: NullDatePolicy) -> Self {
        Self {
            null_dates,
            ..Default::default()
        }
    }

    /// 設定允許的日期範圍（含端點）
    pub fn with_date_range(mut self, min: Option<NaiveDateTime>, max: Option<NaiveDateTime>) -> Self {
        self.min_date = min;
        self.max_date = max;
        self
    }

    /// 計算統計資訊
    pub fn statistics(&self, table: &SnapshotTable) -> SnapshotStats {
        // 每個投資組合的 (最新日期, 該日期的列數)；空日期依策略排在兩端
        let mut latest_by_portfolio: HashMap<&str, (Option<NaiveDateTime>, usize)> = HashMap::new();
        let nulls_newest = self.null_dates == NullDatePolicy::Newest;

        for record in table.records() {
            let entry = latest_by_portfolio
                .entry(record.portfolio.as_str())
                .or_insert((record.as_of_date, 0));

            let ordering = match (record.as_of_date, entry.0) {
                (Some(a), Some(b)) => a.cmp(&b),
                (None, None) => std::cmp::Ordering::Equal,
                (None, Some(_)) if nulls_newest => std::cmp::Ordering::Greater,
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) if nulls_newest => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
            };

            match ordering {
                std::cmp::Ordering::Greater => *entry = (record.as_of_date, 1),
                std::cmp::Ordering::Equal => entry.1 += 1,
                std::cmp::Ordering::Less => {}
            }
        }

        let tied_portfolios = table
            .portfolios()
            .into_iter()
            .filter(|p| latest_by_portfolio.get(p).is_some_and(|(_, count)| *count > 1))
            .map(str::to_string)
            .collect();

        let dates = table.records().iter().filter_map(|r| r.as_of_date);

        SnapshotStats {
            portfolio_count: latest_by_portfolio.len(),
            null_date_count: table.records().iter().filter(|r| r.as_of_date.is_none()).count(),
            tied_portfolios,
            earliest: dates.clone().min(),
            latest: dates.max(),
        }
    }

    /// 驗證整個資料表並產生報告
    pub fn validate(&self, table: &SnapshotTable) -> ValidationReport {
        let mut report = ValidationReport::new(self.name()).with_detailed_errors();

        for (i, record) in table.records().iter().enumerate() {
            match self.validate_item(record) {
                Ok(()) => report.add_success(),
                Err(e) => report.add_error(self.line_of(i, record), &e),
            }
        }

        let stats = self.statistics(table);
        debug!(
            "快照驗證完成: {} 列，{} 個投資組合，{} 個同日並列",
            table.len(),
            stats.portfolio_count,
            stats.tied_portfolios.len()
        );

        report.add_statistic("portfolio_count", stats.portfolio_count);
        report.add_statistic("null_date_count", stats.null_date_count);
        report.add_statistic("tied_portfolios", &stats.tied_portfolios);
        report.add_statistic("earliest", stats.earliest);
        report.add_statistic("latest", stats.latest);
        report.add_statistic("null_dates", self.null_dates.as_str());

        report.finish()
    }
}

impl DataValidator<SnapshotRecord> for SnapshotValidator {
    fn name(&self) -> &str {
        "SnapshotValidator"
    }

    /// 優先使用讀取時記下的行號，多行欄位的記錄才會對得上
    fn line_of(&self, index: usize, record: &SnapshotRecord) -> usize {
        record.line.map_or(index + 2, |line| line as usize)
    }

    fn validate_item(&self, record: &SnapshotRecord) -> ValidationResult<()> {
        if record.portfolio.trim().is_empty() {
            return Err(DataValidationError::MissingData {
                field: ColumnName::PORTFOLIO.to_string(),
            });
        }

        let date = match record.as_of_date {
            Some(date) => date,
            None if self.null_dates == NullDatePolicy::Reject => {
                return Err(DataValidationError::NullAsOfDate {
                    portfolio: record.portfolio.clone(),
                });
            }
            None => return Ok(()),
        };

        let below = self.min_date.is_some_and(|min| date < min);
        let above = self.max_date.is_some_and(|max| date > max);
        if below || above {
            return Err(DataValidationError::RangeError {
                field: ColumnName::AS_OF_DATE.to_string(),
                value: date,
                min: self.min_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
                max: self.max_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
            });
        }

        Ok(())
    }
}
