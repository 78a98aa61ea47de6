use std::path::Path;

use config::ConfigError;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::loader::{ConfigLoader, Environment};
use crate::config::types::ApplicationConfig;
use crate::config::validation::Validator;

// 全局配置實例
static CONFIG: OnceCell<ApplicationConfig> = OnceCell::new();

/// 獲取應用程序配置實例
///
/// 尚未初始化時從環境載入；載入失敗則使用預設配置。
pub fn get_config() -> &'static ApplicationConfig {
    CONFIG.get_or_init(|| {
        ApplicationConfig::load_from_env().unwrap_or_else(|err| {
            warn!("無法加載應用程序配置，使用預設值: {}", err);
            ApplicationConfig::default()
        })
    })
}

/// 初始化配置（在應用程序啟動時調用）
pub fn init_config(app_config: ApplicationConfig) -> &'static ApplicationConfig {
    if CONFIG.set(app_config).is_err() {
        warn!("配置已經被初始化，跳過重複初始化");
    } else {
        debug!("配置初始化成功，環境：{:?}", Environment::from_env());
    }
    get_config()
}

/// ApplicationConfig 加載方法實現
impl ApplicationConfig {
    /// 從環境變數指定的環境加載配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let env = Environment::from_env();
        debug!("從環境加載配置: {:?}", env);
        Self::load_from(&ConfigLoader::config_dir(), env)
    }

    /// 從指定目錄與環境加載配置
    pub fn load_from(config_dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        let config_source = ConfigLoader::load_from(config_dir, env)?;

        let app_config: ApplicationConfig = config_source.try_deserialize()?;

        app_config
            .validate()
            .map_err(|err| ConfigError::Message(format!("配置驗證失敗: {}", err)))?;
        debug!("配置驗證通過");

        Ok(app_config)
    }
}
