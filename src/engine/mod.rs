// ==========================================
// 需求预测与自动调拨系统 - 引擎层
// ==========================================
// 数据流: 交易记录 → 序列构建 → 预测模型 → 编排器统一预测表
//        → 缺口分析（关联库存快照）→ 调拨建议
// 红线: 引擎不读写文件，各阶段返回内存表
// ==========================================

pub mod alerts;
pub mod error;
pub mod forecast_model;
pub mod gap_analyzer;
pub mod orchestrator;
pub mod series_builder;
pub mod transfer_planner;

// 重导出核心引擎
pub use alerts::{ItemTransferTotal, LowStockAlert};
pub use error::{EngineError, EngineResult};
pub use forecast_model::{DemandForecaster, ModelSettings, SeasonalTrendModel};
pub use gap_analyzer::{GapAnalyzer, GapReport, GapSettings};
pub use orchestrator::{
    ForecastOrchestrator, ForecastRunReport, OrchestratorSettings, PairOutcome, SkippedPair,
};
pub use series_builder::SeriesBuilder;
pub use transfer_planner::{TransferPlanner, TransferSettings};
