// ==========================================
// 需求预测与自动调拨系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod forecast;
pub mod inventory;
pub mod transaction;
pub mod transfer;
pub mod types;

// 重导出核心类型
pub use forecast::{ForecastExportRow, ForecastPoint};
pub use inventory::{GapRecord, InventorySnapshot};
pub use transaction::{DemandSeries, TransactionRecord};
pub use transfer::{TransferPlan, TransferSuggestion, UnmetShortage};
pub use types::{PairKey, SeasonalityProfile, TransferStatus};
