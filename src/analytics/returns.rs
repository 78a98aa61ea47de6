//! 月報酬計算

use chrono::NaiveDate;
use ndarray::{Array2, Axis};
use tracing::debug;

use super::error::{AnalyticsError, AnalyticsResult};
use super::prices::PriceTable;
use crate::utils::time_utils::{month_end, next_month_end};

/// 月報酬表：列為月底日期，欄為代碼
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    pub months: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    pub values: Array2<f64>,
}

impl ReturnTable {
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// 月底取樣：每個月份取最後一個不晚於月底的列
pub fn month_end_prices(prices: &PriceTable) -> (Vec<NaiveDate>, Array2<f64>) {
    let (first, last) = match (prices.dates().first(), prices.dates().last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return (Vec::new(), Array2::zeros((0, prices.tickers().len()))),
    };

    let mut labels = Vec::new();
    let mut rows = Vec::new();
    let mut label = month_end(first);
    let stop = month_end(last);
    while label <= stop {
        if let Some(row) = prices.row_on_or_before(label) {
            labels.push(label);
            rows.push(row);
        }
        label = next_month_end(label);
    }

    let sampled = prices.values().select(Axis(0), &rows);
    (labels, sampled)
}

/// 逐欄向前填補 NaN
fn forward_fill(values: &mut Array2<f64>) {
    for mut column in values.columns_mut() {
        let mut last = f64::NAN;
        for v in column.iter_mut() {
            if v.is_nan() {
                *v = last;
            } else {
                last = *v;
            }
        }
    }
}

/// 由價格表計算月報酬
///
/// 月底取樣後向前填補，計算相鄰月份的百分比變化，最後剔除含 NaN 的列
/// （第一列必定被剔除）。
pub fn monthly_returns(prices: &PriceTable) -> AnalyticsResult<ReturnTable> {
    let (labels, mut sampled) = month_end_prices(prices);
    forward_fill(&mut sampled);

    let mut months = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for t in 1..sampled.nrows() {
        let change: Vec<f64> = sampled
            .row(t)
            .iter()
            .zip(sampled.row(t - 1).iter())
            .map(|(curr, prev)| curr / prev - 1.0)
            .collect();
        if change.iter().any(|v| v.is_nan()) {
            continue;
        }
        months.push(labels[t]);
        rows.push(change);
    }

    let ncols = prices.tickers().len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let values = Array2::from_shape_vec((months.len(), ncols), flat)
        .map_err(|e| AnalyticsError::ShapeMismatch(e.to_string()))?;

    debug!("月報酬計算完成: {} 個月 × {} 個代碼", months.len(), ncols);

    Ok(ReturnTable {
        months,
        tickers: prices.tickers().to_vec(),
        values,
    })
}
