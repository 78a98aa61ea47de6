//! 分區排名
//!
//! 以記憶體方式重現 `ROW_NUMBER()` 與 `RANK()`：
//! `PARTITION BY portfolio ORDER BY as_of_date DESC`，Strict 另以 tie-break
//! 鍵與輸入順序作為次要排序。

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::{SelectorError, SelectorResult};
use super::SelectorOptions;
use crate::domain_types::{NullDatePolicy, SnapshotTable, TieBreak};

/// 套用空值策略後的排序鍵
///
/// 變體順序即比較順序：`Lowest < At(_) < Highest`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateKey {
    Lowest,
    At(NaiveDateTime),
    Highest,
}

impl DateKey {
    /// 依空值策略轉換；`Reject` 遇到空值回傳 `None`
    pub fn resolve(date: Option<NaiveDateTime>, nulls: NullDatePolicy) -> Option<Self> {
        match (date, nulls) {
            (Some(dt), _) => Some(DateKey::At(dt)),
            (None, NullDatePolicy::Oldest) => Some(DateKey::Lowest),
            (None, NullDatePolicy::Newest) => Some(DateKey::Highest),
            (None, NullDatePolicy::Reject) => None,
        }
    }
}

/// 將日期鍵編碼為保序的 i64 名次
///
/// 相同的鍵得到相同名次；名次來自完整的 `NaiveDateTime` 比較，不截斷到毫秒。
pub(crate) fn date_ordinals(keys: &[DateKey]) -> Vec<i64> {
    let distinct: BTreeSet<DateKey> = keys.iter().copied().collect();
    let ordinals: HashMap<DateKey, i64> = distinct
        .into_iter()
        .enumerate()
        .map(|(i, k)| (k, i as i64))
        .collect();

    keys.iter().map(|k| ordinals[k]).collect()
}

/// 單列的視窗函數結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    /// 輸入列索引（從 0 起算）
    pub index: usize,
    pub portfolio: String,
    /// ROW_NUMBER()：含 tie-break 的連續編號
    pub row_number: usize,
    /// RANK()：只依日期，同日同名次
    pub rank: usize,
}

/// 計算每列的日期排序鍵
pub(crate) fn resolve_date_keys(
    table: &SnapshotTable,
    nulls: NullDatePolicy,
) -> SelectorResult<Vec<DateKey>> {
    table
        .records()
        .iter()
        .enumerate()
        .map(|(row, record)| {
            DateKey::resolve(record.as_of_date, nulls).ok_or_else(|| SelectorError::NullAsOfDate {
                row,
                portfolio: record.portfolio.clone(),
            })
        })
        .collect()
}

/// 計算每列的 tie-break 鍵：欄位值的字典序名次，`InputOrder` 時全為 0
pub(crate) fn resolve_tie_keys(table: &SnapshotTable, tie_break: &TieBreak) -> SelectorResult<Vec<i64>> {
    let column = match tie_break {
        TieBreak::InputOrder => return Ok(vec![0; table.len()]),
        TieBreak::Column(name) => name,
    };

    let idx = table
        .schema()
        .index_of(column)
        .ok_or_else(|| SelectorError::UnknownColumn(column.clone()))?;

    let distinct: BTreeSet<&str> = table
        .records()
        .iter()
        .map(|r| r.values[idx].as_str())
        .collect();
    let ordinals: HashMap<&str, i64> = distinct
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, i as i64))
        .collect();

    Ok(table
        .records()
        .iter()
        .map(|r| ordinals[r.values[idx].as_str()])
        .collect())
}

/// 依投資組合分區，回傳每個分區的列索引（分區依首次出現排序）
pub(crate) fn partition_indices(table: &SnapshotTable) -> Vec<Vec<usize>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<Vec<usize>> = Vec::new();

    for (i, record) in table.records().iter().enumerate() {
        let slot = *positions.entry(record.portfolio.as_str()).or_insert_with(|| {
            partitions.push(Vec::new());
            partitions.len() - 1
        });
        partitions[slot].push(i);
    }

    partitions
}

/// 為每一列計算 ROW_NUMBER 與 RANK，結果依輸入順序排列
pub fn rank_partitions(table: &SnapshotTable, options: &SelectorOptions) -> SelectorResult<Vec<RankedRow>> {
    let date_keys = resolve_date_keys(table, options.null_dates)?;
    let tie_keys = resolve_tie_keys(table, &options.tie_break)?;

    let mut ranked: Vec<Option<RankedRow>> = vec![None; table.len()];

    for mut partition in partition_indices(table) {
        partition.sort_by(|&a, &b| {
            (Reverse(date_keys[a]), tie_keys[a], a).cmp(&(Reverse(date_keys[b]), tie_keys[b], b))
        });

        let mut rank = 1;
        for (pos, &i) in partition.iter().enumerate() {
            if pos > 0 && date_keys[partition[pos - 1]].cmp(&date_keys[i]) != Ordering::Equal {
                rank = pos + 1;
            }
            ranked[i] = Some(RankedRow {
                index: i,
                portfolio: table.records()[i].portfolio.clone(),
                row_number: pos + 1,
                rank,
            });
        }
    }

    Ok(ranked.into_iter().flatten().collect())
}
