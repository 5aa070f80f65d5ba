// ==========================================
// 需求预测与自动调拨系统 - API 层
// ==========================================
// 职责: 串联 预测 → 缺口 → 调拨 → 预警，返回内存报告
// ==========================================

pub mod error;
pub mod rebalance_api;

pub use error::{ApiError, ApiResult};
pub use rebalance_api::{RebalanceApi, RebalanceReport};
