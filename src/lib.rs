// 模組定義
pub mod analytics;
pub mod config;
pub mod data_ingestion;
pub mod domain_types;
pub mod monitor;
pub mod selector;
pub mod utils;
