// ==========================================
// 需求预测与自动调拨系统 - 配置层
// ==========================================

pub mod config_manager;
pub mod error;
pub mod rebalance_config_trait;
pub mod settings;

pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use rebalance_config_trait::RebalanceConfigReader;
pub use settings::{RebalanceSettings, StaticConfig};
