//! 投資組合快照記錄與資料表

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use thiserror::Error;

use super::types::ColumnName;
use crate::utils::time_utils::{AsOfParser, TimeParseError};

/// 資料表結構錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("缺少必要欄位: {0}")]
    MissingColumn(String),

    #[error("欄位名稱重複: {0}")]
    DuplicateColumn(String),

    #[error("投資組合欄位與基準日欄位不可相同: {0}")]
    SameKeyColumn(String),

    #[error("欄位數不符: 預期 {expected} 欄，實際 {actual} 欄")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("投資組合代碼為空")]
    EmptyPortfolio,

    #[error("as_of_date 解析失敗: {0}")]
    InvalidDate(#[from] TimeParseError),
}

/// 快照資料表結構
///
/// 記錄完整欄位順序以及兩個鍵欄位（portfolio、as_of_date）的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSchema {
    columns: Vec<String>,
    portfolio_idx: usize,
    as_of_idx: usize,
}

impl SnapshotSchema {
    /// 以指定的鍵欄位名稱建立結構
    pub fn new<I, S>(columns: I, portfolio_column: &str, as_of_column: &str) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        if portfolio_column == as_of_column {
            return Err(SchemaError::SameKeyColumn(portfolio_column.to_string()));
        }

        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
        };
        let portfolio_idx = position(portfolio_column)?;
        let as_of_idx = position(as_of_column)?;

        Ok(Self {
            columns,
            portfolio_idx,
            as_of_idx,
        })
    }

    /// 使用預設欄位名稱（portfolio、as_of_date）建立結構
    pub fn with_default_keys<I, S>(columns: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns, ColumnName::PORTFOLIO, ColumnName::AS_OF_DATE)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn portfolio_column(&self) -> &str {
        &self.columns[self.portfolio_idx]
    }

    pub fn as_of_column(&self) -> &str {
        &self.columns[self.as_of_idx]
    }

    pub fn portfolio_index(&self) -> usize {
        self.portfolio_idx
    }

    pub fn as_of_index(&self) -> usize {
        self.as_of_idx
    }

    /// 欄位位置
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// 非鍵欄位（payload）名稱
    pub fn payload_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.portfolio_idx && *i != self.as_of_idx)
            .map(|(_, c)| c.as_str())
    }
}

/// 單筆投資組合快照記錄
///
/// `values` 保存整列原始文字（依結構欄位順序），輸出時原樣帶出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub portfolio: String,
    pub as_of_date: Option<NaiveDateTime>,
    pub values: Vec<String>,
    /// 來源檔案中的起始行號（程式內建構時為 `None`）
    pub line: Option<u64>,
}

impl SnapshotRecord {
    /// 依結構解析一列原始值
    pub fn parse(
        schema: &SnapshotSchema,
        values: Vec<String>,
        parser: &AsOfParser,
    ) -> Result<Self, SchemaError> {
        if values.len() != schema.width() {
            return Err(SchemaError::WidthMismatch {
                expected: schema.width(),
                actual: values.len(),
            });
        }

        let portfolio = values[schema.portfolio_index()].trim().to_string();
        if portfolio.is_empty() {
            return Err(SchemaError::EmptyPortfolio);
        }
        let as_of_date = parser.parse(&values[schema.as_of_index()])?;

        Ok(Self {
            portfolio,
            as_of_date,
            values,
            line: None,
        })
    }

    /// 取得指定欄位的原始值
    pub fn value<'a>(&'a self, schema: &SnapshotSchema, column: &str) -> Option<&'a str> {
        schema
            .index_of(column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }
}

/// 快照資料表（有序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTable {
    schema: SnapshotSchema,
    records: Vec<SnapshotRecord>,
}

impl SnapshotTable {
    /// 建立空資料表
    pub fn new(schema: SnapshotSchema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// 以預設鍵欄位與預設日期格式建立資料表，便於程式內建構
    pub fn from_rows<C, R, V>(columns: C, rows: R) -> Result<Self, SchemaError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let schema = SnapshotSchema::with_default_keys(columns)?;
        let parser = AsOfParser::default();
        let mut table = Self::new(schema);
        for row in rows {
            table.push_row(row.into_iter().map(Into::into).collect(), &parser)?;
        }
        Ok(table)
    }

    /// 解析並加入一列
    pub fn push_row(&mut self, values: Vec<String>, parser: &AsOfParser) -> Result<(), SchemaError> {
        self.push_row_at(values, None, parser)
    }

    /// 解析並加入一列，記下來源行號
    pub fn push_row_at(
        &mut self,
        values: Vec<String>,
        line: Option<u64>,
        parser: &AsOfParser,
    ) -> Result<(), SchemaError> {
        let mut record = SnapshotRecord::parse(&self.schema, values, parser)?;
        record.line = line;
        self.records.push(record);
        Ok(())
    }

    /// 加入已解析的記錄
    pub fn push(&mut self, record: SnapshotRecord) -> Result<(), SchemaError> {
        if record.values.len() != self.schema.width() {
            return Err(SchemaError::WidthMismatch {
                expected: self.schema.width(),
                actual: record.values.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn schema(&self) -> &SnapshotSchema {
        &self.schema
    }

    pub fn records(&self) -> &[SnapshotRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 依輸入順序列出不重複的投資組合
    pub fn portfolios(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .map(|r| r.portfolio.as_str())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// 依列索引取出子表；索引須遞增，輸出維持輸入相對順序
    pub fn subset(&self, indices: &[usize]) -> Self {
        let records = indices
            .iter()
            .filter_map(|&i| self.records.get(i).cloned())
            .collect();
        Self {
            schema: self.schema.clone(),
            records,
        }
    }

    /// 轉換為 JSON 物件列表（欄位名 → 原始文字，as_of_date 空值輸出 null）
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| {
                let mut obj = Map::new();
                for (i, column) in self.schema.columns().iter().enumerate() {
                    let raw = &record.values[i];
                    let value = if i == self.schema.as_of_index() && record.as_of_date.is_none() {
                        Value::Null
                    } else {
                        Value::String(raw.clone())
                    };
                    obj.insert(column.clone(), value);
                }
                Value::Object(obj)
            })
            .collect()
    }
}
