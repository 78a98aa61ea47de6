// utils.rs - 公共工具模組
//
// 提供各種通用的工具函數和輔助方法，用於簡化系統其他部分的代碼。

pub mod time_utils;

// 重新導出時間工具，使其可以通過 utils::name 直接訪問
pub use time_utils::{month_end, next_month_end, parse_date, AsOfParser, TimeParseError};
