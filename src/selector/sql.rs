//! 最新快照 SQL 產生器
//!
//! 產生以視窗函數實作的查詢文字，只負責組字串，不連線、不執行。

use tracing::warn;

use super::error::{SelectorError, SelectorResult};
use super::SelectorOptions;
use crate::domain_types::{ColumnName, NullDatePolicy, QueryStyle, SelectionPolicy, TieBreak};

/// 最新快照查詢
#[derive(Debug, Clone)]
pub struct LatestSnapshotQuery {
    table: String,
    portfolio_column: String,
    as_of_column: String,
    columns: Vec<String>,
    row_id_column: Option<String>,
    options: SelectorOptions,
    style: QueryStyle,
}

impl LatestSnapshotQuery {
    /// 以預設鍵欄位建立查詢
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            portfolio_column: ColumnName::PORTFOLIO.to_string(),
            as_of_column: ColumnName::AS_OF_DATE.to_string(),
            columns: Vec::new(),
            row_id_column: None,
            options: SelectorOptions::default(),
            style: QueryStyle::default(),
        }
    }

    pub fn with_key_columns(mut self, portfolio: impl Into<String>, as_of: impl Into<String>) -> Self {
        self.portfolio_column = portfolio.into();
        self.as_of_column = as_of.into();
        self
    }

    /// 外層輸出的欄位
    ///
    /// 空列表輸出 `*`，結果會多出視窗欄位（見 [`Self::rank_column`]）；
    /// 要與輸入欄位完全一致時請列出欄位。
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// 以輸入順序決勝時使用的列識別欄位
    pub fn with_row_id(mut self, column: impl Into<String>) -> Self {
        self.row_id_column = Some(column.into());
        self
    }

    pub fn with_options(mut self, options: SelectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_style(mut self, style: QueryStyle) -> Self {
        self.style = style;
        self
    }

    /// 視窗函數欄位的別名（Strict 為 `rn`，AllAtMax 為 `rnk`）
    pub fn rank_column(&self) -> &'static str {
        match self.options.policy {
            SelectionPolicy::Strict => "rn",
            SelectionPolicy::AllAtMax => "rnk",
        }
    }

    /// ORDER BY 子句內容
    fn order_by(&self) -> SelectorResult<String> {
        let nulls = match self.options.null_dates {
            NullDatePolicy::Oldest => "NULLS LAST",
            NullDatePolicy::Newest => "NULLS FIRST",
            NullDatePolicy::Reject => {
                return Err(SelectorError::Unsupported(
                    "reject 空值策略無法以查詢表達，請改用 oldest 或 newest".to_string(),
                ))
            }
        };

        let mut order = format!("{} DESC {}", quote_ident(&self.as_of_column)?, nulls);

        if self.options.policy == SelectionPolicy::Strict {
            let secondary = match (&self.options.tie_break, &self.row_id_column) {
                (TieBreak::Column(name), _) => Some(name.as_str()),
                (TieBreak::InputOrder, Some(row_id)) => Some(row_id.as_str()),
                (TieBreak::InputOrder, None) => {
                    warn!("未設定列識別欄位，同日多列的決勝順序將由資料庫決定");
                    None
                }
            };
            if let Some(column) = secondary {
                order.push_str(&format!(", {} ASC", quote_ident(column)?));
            }
        }

        Ok(order)
    }

    /// 產生 SQL
    pub fn to_sql(&self) -> SelectorResult<String> {
        let table = quote_qualified(&self.table)?;
        let partition = quote_ident(&self.portfolio_column)?;
        let order = self.order_by()?;
        let alias = self.rank_column();
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<SelectorResult<Vec<_>>>()?
                .join(", ")
        };

        let window = format!(
            "    SELECT t.*,\n           {}() OVER (PARTITION BY {} ORDER BY {}) AS {}\n    FROM {} t",
            self.options.policy.window_function(),
            partition,
            order,
            alias,
            table
        );

        let sql = match self.style {
            QueryStyle::Subquery => format!(
                "SELECT {}\nFROM (\n{}\n) ranked\nWHERE {} = 1",
                projection, window, alias
            ),
            QueryStyle::Cte => format!(
                "WITH ranked AS (\n{}\n)\nSELECT {}\nFROM ranked\nWHERE {} = 1",
                window, projection, alias
            ),
        };

        Ok(sql)
    }
}

/// 引用 SQL 識別字；簡單的小寫識別字原樣輸出
pub fn quote_ident(name: &str) -> SelectorResult<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(SelectorError::InvalidIdentifier(name.to_string()));
    }

    let mut chars = name.chars();
    let plain = chars
        .next()
        .map(|c| c.is_ascii_lowercase() || c == '_')
        .unwrap_or(false)
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if plain {
        Ok(name.to_string())
    } else {
        Ok(format!("\"{}\"", name.replace('"', "\"\"")))
    }
}

/// 引用可能帶 schema 前綴的表名
fn quote_qualified(name: &str) -> SelectorResult<String> {
    name.split('.')
        .map(quote_ident)
        .collect::<SelectorResult<Vec<_>>>()
        .map(|parts| parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_subquery() {
        let sql = LatestSnapshotQuery::new("portfolio_snapshot")
            .with_columns(["portfolio", "as_of_date", "holding"])
            .with_row_id("snapshot_id")
            .to_sql()
            .unwrap();

        assert_eq!(
            sql,
            "SELECT portfolio, as_of_date, holding\n\
             FROM (\n\
             \x20   SELECT t.*,\n\
             \x20          ROW_NUMBER() OVER (PARTITION BY portfolio ORDER BY as_of_date DESC NULLS LAST, snapshot_id ASC) AS rn\n\
             \x20   FROM portfolio_snapshot t\n\
             ) ranked\n\
             WHERE rn = 1"
        );
    }

    #[test]
    fn test_all_at_max_cte() {
        let sql = LatestSnapshotQuery::new("portfolio_snapshot")
            .with_options(
                SelectorOptions::new(SelectionPolicy::AllAtMax)
                    .with_null_dates(NullDatePolicy::Newest)
                    .with_tie_break(TieBreak::Column("holding".into())),
            )
            .with_style(QueryStyle::Cte)
            .to_sql()
            .unwrap();

        assert!(sql.starts_with("WITH ranked AS (\n"));
        assert!(sql.contains("RANK() OVER (PARTITION BY portfolio ORDER BY as_of_date DESC NULLS FIRST) AS rnk"));
        assert!(!sql.contains("holding"));
        assert!(sql.ends_with("SELECT *\nFROM ranked\nWHERE rnk = 1"));
    }

    #[test]
    fn test_star_projection_carries_rank_column() {
        let query = LatestSnapshotQuery::new("snap");
        assert_eq!(query.rank_column(), "rn");
        assert!(query.to_sql().unwrap().starts_with("SELECT *\nFROM ("));

        let query = query
            .with_options(SelectorOptions::new(SelectionPolicy::AllAtMax))
            .with_columns(["portfolio", "as_of_date"]);
        assert_eq!(query.rank_column(), "rnk");
        let sql = query.to_sql().unwrap();
        let outer = sql.lines().next().unwrap();
        assert_eq!(outer, "SELECT portfolio, as_of_date");
        assert!(!outer.contains("rnk"));
    }

    #[test]
    fn test_tie_break_column_and_missing_row_id() {
        let sql = LatestSnapshotQuery::new("snap")
            .with_options(SelectorOptions::default().with_tie_break(TieBreak::Column("holding".into())))
            .to_sql()
            .unwrap();
        assert!(sql.contains("ORDER BY as_of_date DESC NULLS LAST, holding ASC"));

        let sql = LatestSnapshotQuery::new("snap").to_sql().unwrap();
        assert!(sql.contains("ORDER BY as_of_date DESC NULLS LAST) AS rn"));
    }

    #[test]
    fn test_reject_policy_is_unsupported() {
        let err = LatestSnapshotQuery::new("snap")
            .with_options(SelectorOptions::default().with_null_dates(NullDatePolicy::Reject))
            .to_sql()
            .unwrap_err();
        assert!(matches!(err, SelectorError::Unsupported(_)));
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(quote_ident("as_of_date").unwrap(), "as_of_date");
        assert_eq!(quote_ident("AsOf").unwrap(), "\"AsOf\"");
        assert_eq!(quote_ident("as of").unwrap(), "\"as of\"");
        assert_eq!(quote_ident("a\"b").unwrap(), "\"a\"\"b\"");
        assert_eq!(quote_ident("1st").unwrap(), "\"1st\"");
        assert!(quote_ident("").is_err());
        assert_eq!(quote_qualified("reporting.Snapshots").unwrap(), "reporting.\"Snapshots\"");
    }

    #[test]
    fn test_custom_key_columns() {
        let sql = LatestSnapshotQuery::new("snap")
            .with_key_columns("Portfolio", "AsOf")
            .to_sql()
            .unwrap();
        assert!(sql.contains("PARTITION BY \"Portfolio\" ORDER BY \"AsOf\" DESC NULLS LAST"));
    }
}
