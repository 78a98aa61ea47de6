//! 投資組合分析模組
//!
//! 價格表合併、月報酬與 Gerber 相關係數/共變異數矩陣。

pub mod error;
pub mod gerber;
pub mod prices;
pub mod returns;

pub use error::{AnalyticsError, AnalyticsResult};
pub use gerber::{gerber_cor_cov, sample_std, GerberMatrices, DEFAULT_THRESHOLD};
pub use prices::{PriceSeries, PriceTable};
pub use returns::{month_end_prices, monthly_returns, ReturnTable};
