// ==========================================
// 需求预测与自动调拨系统 - 预测模型
// ==========================================
// 契约: 输入一条 DemandSeries + 预测期天数
//       输出覆盖历史区间 + 预测期的 ForecastPoint 序列
// 红线: 拟合失败必须向上传播，是否跳过由编排器决定
// ==========================================

mod linalg;
pub mod seasonal_trend;

use crate::domain::forecast::ForecastPoint;
use crate::domain::transaction::DemandSeries;
use crate::engine::error::EngineResult;

pub use seasonal_trend::{FittedSeasonalTrend, ModelSettings, SeasonalTrendModel};

// ==========================================
// DemandForecaster Trait
// ==========================================
// 实现者: SeasonalTrendModel
// 要求 Send + Sync: 编排器在阻塞线程池中并行调用
pub trait DemandForecaster: Send + Sync {
    /// 拟合序列并预测 `horizon` 天
    fn fit_predict(&self, series: &DemandSeries, horizon: usize) -> EngineResult<Vec<ForecastPoint>>;

    /// 模型名称
    fn name(&self) -> &str;
}
