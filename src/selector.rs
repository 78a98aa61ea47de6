//! 最新記錄選取器
//!
//! 對每個投資組合只保留 `as_of_date` 最大的記錄。提供兩種策略：
//!
//! - **Strict**（`ROW_NUMBER()`）：每個投資組合恰好一列
//! - **AllAtMax**（`RANK()`）：保留最新日期的所有列（例如同日多筆持倉）
//!
//! 以及兩個結果一致的引擎（記憶體排名、Polars 視窗表達式）與 SQL 產生器。
//!
//! # 使用範例
//!
//! ```rust,ignore
//! use latest_snapshot::selector::{selector_for, SelectorOptions};
//! use latest_snapshot::domain_types::{Engine, SelectionPolicy};
//!
//! let selector = selector_for(Engine::Memory, SelectorOptions::new(SelectionPolicy::AllAtMax));
//! let latest = selector.select(&table)?;
//! ```

pub mod error;
pub mod frame;
pub mod in_memory;
pub mod ranking;
pub mod sql;

pub use error::{SelectorError, SelectorResult};
pub use frame::FrameSelector;
pub use in_memory::LatestRecordSelector;
pub use ranking::{rank_partitions, DateKey, RankedRow};
pub use sql::LatestSnapshotQuery;

use serde::{Deserialize, Serialize};

use crate::domain_types::{Engine, NullDatePolicy, SelectionPolicy, SnapshotTable, TieBreak};

/// 選取選項
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOptions {
    pub policy: SelectionPolicy,
    pub null_dates: NullDatePolicy,
    pub tie_break: TieBreak,
}

impl SelectorOptions {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn with_null_dates(mut self, null_dates: NullDatePolicy) -> Self {
        self.null_dates = null_dates;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}

/// 選取器特徵
pub trait RecordSelector: Send + Sync {
    /// 引擎名稱
    fn name(&self) -> &'static str;

    /// 目前的選取選項
    fn options(&self) -> &SelectorOptions;

    /// 選出每個投資組合的最新記錄，輸出維持輸入相對順序
    fn select(&self, table: &SnapshotTable) -> SelectorResult<SnapshotTable>;
}

/// 依引擎建立選取器
pub fn selector_for(engine: Engine, options: SelectorOptions) -> Box<dyn RecordSelector> {
    match engine {
        Engine::Memory => Box::new(LatestRecordSelector::new(options)),
        Engine::Polars => Box::new(FrameSelector::new(options)),
    }
}

/// 以記憶體引擎選取
pub fn select_latest(table: &SnapshotTable, options: &SelectorOptions) -> SelectorResult<SnapshotTable> {
    LatestRecordSelector::new(options.clone()).select(table)
}
