//! 資料驗證器模組
//!
//! 在選取之前檢查快照資料的品質，並產生可序列化的驗證報告。
//!
//! # 主要功能
//!
//! - **欄位完整性檢查**：投資組合欄位不可為空
//! - **空基準日檢查**：依空值策略決定是否視為錯誤
//! - **日期範圍驗證**：可選的最早/最晚基準日
//! - **統計資訊**：投資組合數、空日期數、最新日期並列的投資組合
//!
//! # 使用範例
//!
//! ```rust,ignore
//! use latest_snapshot::data_ingestion::validator::{ReportFormatter, SnapshotValidator};
//! use latest_snapshot::domain_types::NullDatePolicy;
//!
//! let report = SnapshotValidator::new(NullDatePolicy::Reject).validate(&table);
//! println!("{}", ReportFormatter::format_text(&report));
//! ```

pub mod error;
pub mod report;
pub mod snapshot_validator;
pub mod traits;

// 重新導出常用類型
pub use error::{DataValidationError, ValidationErrors, ValidationResult};
pub use report::{ReportFormatter, ValidationReport};
pub use snapshot_validator::{SnapshotStats, SnapshotValidator};
pub use traits::DataValidator;
