//! 基於 Polars 視窗表達式的最新記錄選取器
//!
//! 與 SQL 寫法對應：先以 `max(as_of) over portfolio` 篩出最新日期，
//! Strict 再以 `min(tie) over portfolio`、`min(row) over portfolio`
//! 收斂為單列。日期與 tie-break 鍵在交給 Polars 之前先編碼為 i64 名次，
//! 空值策略因此不依賴 Polars 的空值排序行為。

use polars::prelude::*;
use tracing::debug;

use super::error::SelectorResult;
use super::ranking::{date_ordinals, resolve_date_keys, resolve_tie_keys};
use super::{RecordSelector, SelectorOptions};
use crate::domain_types::{SelectionPolicy, SnapshotTable};

const PORTFOLIO: &str = "__portfolio";
const AS_OF_KEY: &str = "__as_of_key";
const TIE_KEY: &str = "__tie_key";
const ROW_NR: &str = "__row_nr";

/// Polars 選取器
#[derive(Debug, Clone, Default)]
pub struct FrameSelector {
    options: SelectorOptions,
}

impl FrameSelector {
    pub fn new(options: SelectorOptions) -> Self {
        Self { options }
    }

    /// 建立只含鍵欄位的 DataFrame
    fn key_frame(&self, table: &SnapshotTable) -> SelectorResult<DataFrame> {
        let portfolios: Vec<String> = table
            .records()
            .iter()
            .map(|r| r.portfolio.clone())
            .collect();
        let as_of_keys = date_ordinals(&resolve_date_keys(table, self.options.null_dates)?);
        let tie_keys = resolve_tie_keys(table, &self.options.tie_break)?;
        let row_nrs: Vec<i64> = (0..table.len() as i64).collect();

        let df = df![
            PORTFOLIO => portfolios,
            AS_OF_KEY => as_of_keys,
            TIE_KEY => tie_keys,
            ROW_NR => row_nrs,
        ]?;

        Ok(df)
    }

    /// 保留每個分區中 `column` 等於分區極值的列
    fn keep_partition_extreme(df: DataFrame, column: &str, highest: bool) -> PolarsResult<DataFrame> {
        let extreme = if highest {
            col(column).max()
        } else {
            col(column).min()
        };

        // 每一階段各自 collect，視窗只在上一階段的結果上計算
        df.lazy()
            .filter(col(column).eq(extreme.over([col(PORTFOLIO)])))
            .collect()
    }
}

impl RecordSelector for FrameSelector {
    fn name(&self) -> &'static str {
        "polars"
    }

    fn options(&self) -> &SelectorOptions {
        &self.options
    }

    fn select(&self, table: &SnapshotTable) -> SelectorResult<SnapshotTable> {
        let df = self.key_frame(table)?;
        if table.is_empty() {
            return Ok(table.subset(&[]));
        }

        let mut df = Self::keep_partition_extreme(df, AS_OF_KEY, true)?;

        if self.options.policy == SelectionPolicy::Strict {
            df = Self::keep_partition_extreme(df, TIE_KEY, false)?;
            df = Self::keep_partition_extreme(df, ROW_NR, false)?;
        }

        let df = df.sort([ROW_NR], SortMultipleOptions::default())?;
        let keep: Vec<usize> = df
            .column(ROW_NR)?
            .as_materialized_series()
            .i64()?
            .into_no_null_iter()
            .map(|i| i as usize)
            .collect();

        debug!(
            "Polars 選取完成: 輸入 {} 列，保留 {} 列（{}）",
            table.len(),
            keep.len(),
            self.options.policy
        );

        Ok(table.subset(&keep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_types::{NullDatePolicy, TieBreak};
    use crate::selector::SelectorError;

    fn sample() -> SnapshotTable {
        SnapshotTable::from_rows(
            ["portfolio", "as_of_date", "holding"],
            vec![
                vec!["A", "2023-01-01", "x1"],
                vec!["A", "2023-02-01", "x2"],
                vec!["B", "2023-01-15", "y1"],
                vec!["B", "2023-01-15", "y0"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_key_frame_shape() {
        let df = FrameSelector::default().key_frame(&sample()).unwrap();
        assert_eq!(df.height(), 4);
        assert_eq!(df.width(), 4);
        assert!(df.column(AS_OF_KEY).is_ok());
    }

    #[test]
    fn test_strict_selection() {
        let out = FrameSelector::default().select(&sample()).unwrap();
        let holdings: Vec<&str> = out.records().iter().map(|r| r.values[2].as_str()).collect();
        assert_eq!(holdings, vec!["x2", "y1"]);
    }

    #[test]
    fn test_strict_column_tie_break() {
        let options = SelectorOptions::default().with_tie_break(TieBreak::Column("holding".into()));
        let out = FrameSelector::new(options).select(&sample()).unwrap();
        let holdings: Vec<&str> = out.records().iter().map(|r| r.values[2].as_str()).collect();
        assert_eq!(holdings, vec!["x2", "y0"]);
    }

    #[test]
    fn test_all_at_max_selection() {
        let out = FrameSelector::new(SelectorOptions::new(SelectionPolicy::AllAtMax))
            .select(&sample())
            .unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_empty_table() {
        let table = SnapshotTable::from_rows(["portfolio", "as_of_date"], Vec::<Vec<&str>>::new())
            .unwrap();
        let out = FrameSelector::default().select(&table).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.schema(), table.schema());
    }

    #[test]
    fn test_reject_null_dates() {
        let table = SnapshotTable::from_rows(
            ["portfolio", "as_of_date"],
            vec![vec!["A", "2023-01-01"], vec!["B", ""]],
        )
        .unwrap();
        let options = SelectorOptions::default().with_null_dates(NullDatePolicy::Reject);
        let err = FrameSelector::new(options).select(&table).unwrap_err();
        assert!(matches!(err, SelectorError::NullAsOfDate { row: 1, .. }));
    }
}
