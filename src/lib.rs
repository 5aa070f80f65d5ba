// ==========================================
// 需求预测与自动调拨系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite（配置存储）
// 系统定位: 决策支持系统（调拨建议由人工确认执行）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 预测 / 缺口 / 调拨
pub mod engine;

// 导入层 - 外部表格
pub mod importer;

// 导出层 - CSV 输出
pub mod export;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DemandSeries, ForecastPoint, GapRecord, InventorySnapshot, PairKey, SeasonalityProfile,
    TransactionRecord, TransferPlan, TransferStatus, TransferSuggestion, UnmetShortage,
};

// 引擎
pub use engine::{
    DemandForecaster, EngineError, ForecastOrchestrator, ForecastRunReport, GapAnalyzer,
    GapReport, SeasonalTrendModel, SeriesBuilder, TransferPlanner,
};

// 配置
pub use config::{ConfigManager, RebalanceConfigReader, RebalanceSettings, StaticConfig};

// API
pub use api::{ApiError, RebalanceApi, RebalanceReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "需求预测与自动调拨系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
