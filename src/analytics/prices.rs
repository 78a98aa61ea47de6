//! 價格序列與價格表

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use ndarray::Array2;

use super::error::{AnalyticsError, AnalyticsResult};

/// 單一代碼的價格序列
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            ticker: ticker.into(),
            points,
        }
    }
}

/// 價格表：列為日期（嚴格遞增），欄為代碼，缺值以 NaN 表示
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    values: Array2<f64>,
}

impl PriceTable {
    pub fn new(dates: Vec<NaiveDate>, tickers: Vec<String>, values: Array2<f64>) -> AnalyticsResult<Self> {
        if values.nrows() != dates.len() || values.ncols() != tickers.len() {
            return Err(AnalyticsError::ShapeMismatch(format!(
                "{} 個日期 × {} 個代碼，矩陣為 {:?}",
                dates.len(),
                tickers.len(),
                values.shape()
            )));
        }
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::UnsortedDates(format!("{} 之後為 {}", pair[0], pair[1])));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = tickers.iter().find(|t| !seen.insert(t.as_str())) {
            return Err(AnalyticsError::DuplicateTicker(dup.clone()));
        }

        Ok(Self {
            dates,
            tickers,
            values,
        })
    }

    /// 以日期聯集外部合併多個序列，每個序列一欄
    ///
    /// 序列中的 NaN 價格先行剔除；同一序列同日多筆時保留最後一筆。
    pub fn outer_merge(series: Vec<PriceSeries>) -> AnalyticsResult<Self> {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|s| s.points.iter().filter(|(_, p)| !p.is_nan()).map(|(d, _)| *d))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let positions: BTreeMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut values = Array2::from_elem((dates.len(), series.len()), f64::NAN);
        for (col, s) in series.iter().enumerate() {
            for (date, price) in s.points.iter().filter(|(_, p)| !p.is_nan()) {
                values[[positions[date], col]] = *price;
            }
        }

        let tickers = series.into_iter().map(|s| s.ticker).collect();
        Self::new(dates, tickers, values)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// 最後一個不晚於 `date` 的列
    pub fn row_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        self.dates.partition_point(|d| *d <= date).checked_sub(1)
    }
}
