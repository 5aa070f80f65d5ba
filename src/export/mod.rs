// ==========================================
// 需求预测与自动调拨系统 - 导出层
// ==========================================
// 职责: 内存表 → CSV
// 红线: 引擎各阶段不隐式写文件，由调用方显式导出
// ==========================================

pub mod csv_exporter;
pub mod error;

pub use csv_exporter::{
    CsvExporter, FILTERED_TRANSFER_PLAN_FILE, FULL_FORECAST_FILE, GAP_TABLE_FILE,
    TRANSFER_PLAN_FILE,
};
pub use error::{ExportError, ExportResult};
