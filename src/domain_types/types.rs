//! 快照選取相關的基本類型定義

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 預設欄位名稱
pub struct ColumnName;

impl ColumnName {
    pub const PORTFOLIO: &'static str = "portfolio"; // 投資組合代碼
    pub const AS_OF_DATE: &'static str = "as_of_date"; // 資料基準日
    pub const HOLDING: &'static str = "holding"; // 持倉
}

/// 每個投資組合要保留哪些列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// 每個投資組合恰好一列（ROW_NUMBER 語意），同日以 tie-break 規則決定
    #[default]
    Strict,
    /// 保留最新日期的所有列（RANK 語意）
    AllAtMax,
}

impl SelectionPolicy {
    /// 對應的 SQL 視窗函數
    pub fn window_function(&self) -> &'static str {
        match self {
            SelectionPolicy::Strict => "ROW_NUMBER",
            SelectionPolicy::AllAtMax => "RANK",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::Strict => "strict",
            SelectionPolicy::AllAtMax => "all_at_max",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "strict" | "row_number" => Ok(SelectionPolicy::Strict),
            "all_at_max" | "all" | "rank" => Ok(SelectionPolicy::AllAtMax),
            other => Err(format!("未知的選取策略: {}", other)),
        }
    }
}

/// 空 as_of_date 的排序規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NullDatePolicy {
    /// 空值早於任何日期（DESC NULLS LAST）
    #[default]
    Oldest,
    /// 空值晚於任何日期（DESC NULLS FIRST）
    Newest,
    /// 出現空值即失敗
    Reject,
}

impl NullDatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NullDatePolicy::Oldest => "oldest",
            NullDatePolicy::Newest => "newest",
            NullDatePolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for NullDatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NullDatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oldest" | "nulls_last" => Ok(NullDatePolicy::Oldest),
            "newest" | "nulls_first" => Ok(NullDatePolicy::Newest),
            "reject" => Ok(NullDatePolicy::Reject),
            other => Err(format!("未知的空值策略: {}", other)),
        }
    }
}

/// Strict 策略下同日多列的決勝規則
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// 輸入順序最前者勝出
    #[default]
    InputOrder,
    /// 指定欄位值（字典序）最小者勝出，再以輸入順序決定
    Column(String),
}

impl TieBreak {
    /// 由可選欄位名稱建立
    pub fn from_column(column: Option<&str>) -> Self {
        match column.map(str::trim) {
            Some(name) if !name.is_empty() => TieBreak::Column(name.to_string()),
            _ => TieBreak::InputOrder,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            TieBreak::InputOrder => None,
            TieBreak::Column(name) => Some(name.as_str()),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::InputOrder => f.write_str("input_order"),
            TieBreak::Column(name) => write!(f, "column({})", name),
        }
    }
}

/// 選取引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// 記憶體內分組排名
    #[default]
    Memory,
    /// Polars 視窗表達式
    Polars,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Memory => "memory",
            Engine::Polars => "polars",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Engine::Memory),
            "polars" | "frame" => Ok(Engine::Polars),
            other => Err(format!("未知的選取引擎: {}", other)),
        }
    }
}

/// SQL 查詢外形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryStyle {
    /// 衍生表子查詢
    #[default]
    Subquery,
    /// WITH ranked AS (...)
    Cte,
}

impl QueryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStyle::Subquery => "subquery",
            QueryStyle::Cte => "cte",
        }
    }
}

impl FromStr for QueryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "subquery" => Ok(QueryStyle::Subquery),
            "cte" | "with" => Ok(QueryStyle::Cte),
            other => Err(format!("未知的查詢外形: {}", other)),
        }
    }
}
