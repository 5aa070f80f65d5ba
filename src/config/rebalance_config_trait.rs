// ==========================================
// 需求预测与自动调拨系统 - 配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 实现者: ConfigManager（config_kv 表）、StaticConfig（内存）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use crate::domain::types::SeasonalityProfile;
use async_trait::async_trait;

#[async_trait]
pub trait RebalanceConfigReader: Send + Sync {
    // ===== 预测配置 =====

    /// 预测期天数
    ///
    /// # 默认值
    /// - 30
    async fn get_horizon_days(&self) -> ConfigResult<usize>;

    /// 最小历史天数（首日到末日，含两端）
    ///
    /// # 默认值
    /// - 2
    async fn get_min_history_days(&self) -> ConfigResult<usize>;

    /// 季节性配置
    ///
    /// # 默认值
    /// - 周: 开启; 年: 关闭; 日: 关闭
    async fn get_seasonality(&self) -> ConfigResult<SeasonalityProfile>;

    /// 预测区间宽度
    ///
    /// # 默认值
    /// - 0.80
    async fn get_interval_width(&self) -> ConfigResult<f64>;

    /// 单组合拟合超时（毫秒）
    ///
    /// # 默认值
    /// - 30000
    async fn get_fit_timeout_ms(&self) -> ConfigResult<u64>;

    /// 并行度（0 = 按 CPU 数）
    ///
    /// # 默认值
    /// - 0
    async fn get_max_parallelism(&self) -> ConfigResult<usize>;

    // ===== 缺口配置 =====

    /// 近期窗口天数
    ///
    /// # 默认值
    /// - 7
    async fn get_gap_window_days(&self) -> ConfigResult<usize>;

    /// 负预测值是否截断为 0
    ///
    /// # 默认值
    /// - false
    async fn get_clamp_negative_demand(&self) -> ConfigResult<bool>;

    // ===== 调拨配置 =====

    /// 最小富余阈值（件）
    ///
    /// # 默认值
    /// - 10
    async fn get_min_surplus_threshold(&self) -> ConfigResult<i64>;

    // ===== 快照 =====

    /// 配置快照（JSON），记录在运行报告中
    async fn config_snapshot(&self) -> ConfigResult<String>;
}
