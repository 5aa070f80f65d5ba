// ==========================================
// 需求预测与自动调拨系统 - 导入层
// ==========================================
// 职责: 外部表格 → 交易记录 / 库存快照
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod file_parser;
pub mod table_mapper;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use table_mapper::TableMapper;

use crate::domain::inventory::InventorySnapshot;
use crate::domain::transaction::TransactionRecord;
use std::path::Path;
use tracing::info;

/// 从文件导入交易记录
pub fn import_transactions<P: AsRef<Path>>(path: P) -> ImportResult<Vec<TransactionRecord>> {
    let path = path.as_ref();
    let rows = UniversalFileParser.parse(path)?;
    let records = TableMapper.map_transactions(&rows)?;
    info!(path = %path.display(), rows = records.len(), "交易记录导入完成");
    Ok(records)
}

/// 从文件导入库存快照
pub fn import_inventory<P: AsRef<Path>>(path: P) -> ImportResult<Vec<InventorySnapshot>> {
    let path = path.as_ref();
    let rows = UniversalFileParser.parse(path)?;
    let snapshots = TableMapper.map_inventory(&rows)?;
    info!(path = %path.display(), rows = snapshots.len(), "库存快照导入完成");
    Ok(snapshots)
}
