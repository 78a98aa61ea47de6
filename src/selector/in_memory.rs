//! 記憶體內的最新記錄選取器

use tracing::debug;

use super::error::SelectorResult;
use super::ranking::rank_partitions;
use super::{RecordSelector, SelectorOptions};
use crate::domain_types::{SelectionPolicy, SnapshotTable};

/// 以分區排名實作的選取器
///
/// 對每個投資組合計算 `ROW_NUMBER()`（Strict）或 `RANK()`（AllAtMax），
/// 只保留名次為 1 的列。
#[derive(Debug, Clone, Default)]
pub struct LatestRecordSelector {
    options: SelectorOptions,
}

impl LatestRecordSelector {
    pub fn new(options: SelectorOptions) -> Self {
        Self { options }
    }
}

impl RecordSelector for LatestRecordSelector {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn options(&self) -> &SelectorOptions {
        &self.options
    }

    fn select(&self, table: &SnapshotTable) -> SelectorResult<SnapshotTable> {
        let ranked = rank_partitions(table, &self.options)?;

        let keep: Vec<usize> = ranked
            .iter()
            .filter(|row| match self.options.policy {
                SelectionPolicy::Strict => row.row_number == 1,
                SelectionPolicy::AllAtMax => row.rank == 1,
            })
            .map(|row| row.index)
            .collect();

        debug!(
            "記憶體選取完成: 輸入 {} 列，保留 {} 列（{}）",
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

    fn holdings() -> SnapshotTable {
        SnapshotTable::from_rows(
            ["portfolio", "as_of_date", "holding"],
            vec![
                vec!["A", "2023-02-01", "holding2"],
                vec!["A", "2023-02-01", "holding1"],
                vec!["A", "2023-01-01", "holding3"],
                vec!["B", "2023-01-15", "y1"],
            ],
        )
        .unwrap()
    }

    fn holding_values(table: &SnapshotTable) -> Vec<&str> {
        table
            .records()
            .iter()
            .map(|r| r.values[2].as_str())
            .collect()
    }

    #[test]
    fn test_strict_input_order_tie_break() {
        let out = LatestRecordSelector::default().select(&holdings()).unwrap();
        assert_eq!(holding_values(&out), vec!["holding2", "y1"]);
    }

    #[test]
    fn test_strict_column_tie_break() {
        let options =
            SelectorOptions::default().with_tie_break(TieBreak::Column("holding".into()));
        let out = LatestRecordSelector::new(options).select(&holdings()).unwrap();
        assert_eq!(holding_values(&out), vec!["holding1", "y1"]);
    }

    #[test]
    fn test_all_at_max_keeps_ties_in_input_order() {
        let out = LatestRecordSelector::new(SelectorOptions::new(SelectionPolicy::AllAtMax))
            .select(&holdings())
            .unwrap();
        assert_eq!(holding_values(&out), vec!["holding2", "holding1", "y1"]);
    }

    #[test]
    fn test_all_null_portfolio_is_kept() {
        let table = SnapshotTable::from_rows(
            ["portfolio", "as_of_date", "holding"],
            vec![vec!["A", "", "n1"], vec!["A", "", "n2"]],
        )
        .unwrap();
        let options = SelectorOptions::new(SelectionPolicy::AllAtMax)
            .with_null_dates(NullDatePolicy::Oldest);
        let out = LatestRecordSelector::new(options).select(&table).unwrap();
        assert_eq!(out.len(), 2);
    }
}
