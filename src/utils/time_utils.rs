// time_utils.rs
//
// 提供 as_of 日期解析與轉換相關的工具函數。
// 主要功能：
// 1. 以多種格式解析 as_of_date 字串（日期或日期時間）
// 2. 月份邊界計算（供月報酬重採樣使用）

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// 預設的日期時間格式（依序嘗試）
pub const DEFAULT_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// 預設的純日期格式（依序嘗試）
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// 時間解析錯誤
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("無法解析日期: '{value}'，已嘗試格式: {formats:?}")]
    Unrecognized { value: String, formats: Vec<String> },
}

/// as_of_date 解析器
///
/// 空字串與 `null`（不分大小寫）視為空值；其他字串依序嘗試
/// 設定的格式，最後嘗試 RFC 3339。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsOfParser {
    formats: Vec<String>,
}

impl Default for AsOfParser {
    fn default() -> Self {
        let formats = DEFAULT_DATE_FORMATS
            .iter()
            .chain(DEFAULT_DATETIME_FORMATS.iter())
            .map(|s| s.to_string())
            .collect();
        Self { formats }
    }
}

impl AsOfParser {
    /// 使用自定義格式列表創建解析器，空列表時退回預設格式
    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let formats: Vec<String> = formats.into_iter().map(Into::into).collect();
        if formats.is_empty() {
            return Self::default();
        }
        Self { formats }
    }

    /// 目前使用的格式
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// 判斷字串是否代表空值
    pub fn is_null_token(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
    }

    /// 解析 as_of_date，空值回傳 `Ok(None)`
    pub fn parse(&self, value: &str) -> Result<Option<NaiveDateTime>, TimeParseError> {
        if Self::is_null_token(value) {
            return Ok(None);
        }
        let trimmed = value.trim();

        for fmt in &self.formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(Some(dt));
            }
            // 純日期格式無法直接解析成 NaiveDateTime
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Ok(date.and_hms_opt(0, 0, 0));
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Some(dt.naive_utc()));
        }

        Err(TimeParseError::Unrecognized {
            value: trimmed.to_string(),
            formats: self.formats.clone(),
        })
    }
}

/// 解析單一日期（供價格表使用），只接受純日期與日期時間格式
pub fn parse_date(value: &str) -> Result<NaiveDate, TimeParseError> {
    match AsOfParser::default().parse(value)? {
        Some(dt) => Ok(dt.date()),
        None => Err(TimeParseError::Unrecognized {
            value: value.to_string(),
            formats: Vec::new(),
        }),
    }
}

/// 該日期所在月份的最後一天
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// 下一個月份的最後一天
pub fn next_month_end(date: NaiveDate) -> NaiveDate {
    let end = month_end(date);
    end.succ_opt().map(month_end).unwrap_or(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_only() {
        let parser = AsOfParser::default();
        let parsed = parser.parse("2023-02-01").unwrap().unwrap();
        assert_eq!(parsed, ymd(2023, 2, 1).and_hms_opt(0, 0, 0).unwrap());

        let parsed = parser.parse("20230201").unwrap().unwrap();
        assert_eq!(parsed.date(), ymd(2023, 2, 1));
    }

    #[test]
    fn test_parse_datetime_and_rfc3339() {
        let parser = AsOfParser::default();
        let parsed = parser.parse("2023-02-01 13:45:00").unwrap().unwrap();
        assert_eq!(parsed, ymd(2023, 2, 1).and_hms_opt(13, 45, 0).unwrap());

        let parsed = parser.parse("2023-02-01T13:45:00+02:00").unwrap().unwrap();
        assert_eq!(parsed, ymd(2023, 2, 1).and_hms_opt(11, 45, 0).unwrap());
    }

    #[test]
    fn test_null_tokens() {
        let parser = AsOfParser::default();
        assert_eq!(parser.parse("").unwrap(), None);
        assert_eq!(parser.parse("   ").unwrap(), None);
        assert_eq!(parser.parse("NULL").unwrap(), None);
        assert_eq!(parser.parse("null").unwrap(), None);
    }

    #[test]
    fn test_unrecognized_date() {
        let parser = AsOfParser::with_formats(["%d.%m.%Y"]);
        assert!(parser.parse("01.02.2023").unwrap().is_some());
        let err = parser.parse("2023-02-01").unwrap_err();
        assert!(matches!(err, TimeParseError::Unrecognized { .. }));
    }

    #[test]
    fn test_empty_format_list_uses_defaults() {
        let parser = AsOfParser::with_formats(Vec::<String>::new());
        assert_eq!(parser, AsOfParser::default());
    }

    #[test]
    fn test_month_end() {
        assert_eq!(month_end(ymd(2023, 1, 15)), ymd(2023, 1, 31));
        assert_eq!(month_end(ymd(2024, 2, 1)), ymd(2024, 2, 29));
        assert_eq!(month_end(ymd(2023, 12, 31)), ymd(2023, 12, 31));
        assert_eq!(next_month_end(ymd(2023, 12, 5)), ymd(2024, 1, 31));
        assert_eq!(next_month_end(ymd(2023, 1, 31)), ymd(2023, 2, 28));
    }

    #[test]
    fn test_parse_keeps_microseconds() {
        let parser = AsOfParser::default();
        let parsed = parser.parse("2023-02-01 10:00:00.000250").unwrap().unwrap();
        assert_eq!(parsed, ymd(2023, 2, 1).and_hms_micro_opt(10, 0, 0, 250).unwrap());
    }
}
