/// 配置管理模組
///
/// 本模組負責加載、驗證和管理系統配置。
/// 配置來源依優先序：各區段預設值、`config/<env>.toml`、`SNAPSHOT__*` 環境變數。
pub mod loader;
pub mod manager;
pub mod types;
pub mod validation;

// 重新導出常用組件
pub use loader::{ConfigExt, ConfigLoader, Environment};
pub use manager::{get_config, init_config};
pub use types::*;
pub use validation::{validate_config, ValidationError, ValidationUtils, Validator};

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_exports() {
        let _ = super::Environment::Development;
        let config = super::ApplicationConfig::default();
        assert!(super::validate_config(&config).is_ok());
        assert_eq!(config.sql.table, "portfolio_snapshots");
    }
}
