// ==========================================
// 需求预测与自动调拨系统 - 表映射器实现
// ==========================================
// 职责: 原始行 → 交易记录 / 库存快照 + 类型转换
// 交易表列: date, sku_id, warehouse_id, quantity_sold
// 库存表列: sku_id, warehouse_id, current_inventory
// ==========================================

use crate::domain::inventory::InventorySnapshot;
use crate::domain::transaction::TransactionRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use chrono::{Days, NaiveDate, NaiveDateTime};

/// 标准列名
pub mod columns {
    pub const DATE: &str = "date";
    pub const SKU_ID: &str = "sku_id";
    pub const WAREHOUSE_ID: &str = "warehouse_id";
    pub const QUANTITY_SOLD: &str = "quantity_sold";
    pub const CURRENT_INVENTORY: &str = "current_inventory";
}

pub struct TableMapper;

impl TableMapper {
    /// 映射交易表
    ///
    /// # 错误
    /// - 缺少必需列 → MissingColumn
    /// - 任一行解析失败 → 行级错误（带行号）
    pub fn map_transactions(&self, rows: &[RawRow]) -> ImportResult<Vec<TransactionRecord>> {
        self.require_columns(
            rows,
            &[
                columns::DATE,
                columns::SKU_ID,
                columns::WAREHOUSE_ID,
                columns::QUANTITY_SOLD,
            ],
        )?;

        rows.iter()
            .map(|row| {
                Ok(TransactionRecord::new(
                    self.parse_date(row, columns::DATE)?,
                    self.require_string(row, columns::SKU_ID)?,
                    self.require_string(row, columns::WAREHOUSE_ID)?,
                    self.parse_quantity(row, columns::QUANTITY_SOLD)?,
                ))
            })
            .collect()
    }

    /// 映射库存快照表
    pub fn map_inventory(&self, rows: &[RawRow]) -> ImportResult<Vec<InventorySnapshot>> {
        self.require_columns(
            rows,
            &[
                columns::SKU_ID,
                columns::WAREHOUSE_ID,
                columns::CURRENT_INVENTORY,
            ],
        )?;

        rows.iter()
            .map(|row| {
                Ok(InventorySnapshot::new(
                    self.require_string(row, columns::SKU_ID)?,
                    self.require_string(row, columns::WAREHOUSE_ID)?,
                    self.parse_quantity(row, columns::CURRENT_INVENTORY)?,
                ))
            })
            .collect()
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 列名别名
    fn aliases(key: &str) -> &'static [&'static str] {
        match key {
            columns::DATE => &["date", "ds", "日期"],
            columns::SKU_ID => &["sku_id", "item_id", "商品编码"],
            columns::WAREHOUSE_ID => &["warehouse_id", "location_id", "仓库编码"],
            columns::QUANTITY_SOLD => &["quantity_sold", "quantity", "销量"],
            columns::CURRENT_INVENTORY => &["current_inventory", "inventory", "当前库存"],
            _ => &[],
        }
    }

    fn require_columns(&self, rows: &[RawRow], required: &[&str]) -> ImportResult<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        for key in required {
            let present = Self::aliases(key)
                .iter()
                .any(|alias| first.values.contains_key(*alias));
            if !present {
                return Err(ImportError::MissingColumn(key.to_string()));
            }
        }
        Ok(())
    }

    fn get_string<'a>(&self, row: &'a RawRow, key: &str) -> Option<&'a str> {
        Self::aliases(key)
            .iter()
            .filter_map(|alias| row.get(alias))
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    fn require_string(&self, row: &RawRow, key: &str) -> ImportResult<String> {
        self.get_string(row, key)
            .map(str::to_string)
            .ok_or_else(|| ImportError::MissingValue {
                row: row.row_number,
                field: key.to_string(),
            })
    }

    /// 解析非负数量
    fn parse_quantity(&self, row: &RawRow, key: &str) -> ImportResult<f64> {
        let raw = self.require_string(row, key)?;
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::TypeConversionError {
                row: row.row_number,
                field: key.to_string(),
                message: format!("无法解析为数值: {}", raw),
            })?;

        if value < 0.0 {
            return Err(ImportError::NegativeValue {
                row: row.row_number,
                field: key.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// 解析日期
    ///
    /// 支持 YYYY-MM-DD / YYYY/MM/DD / YYYYMMDD / YYYY-MM-DD HH:MM:SS，
    /// 以及 Excel 日期序列号
    fn parse_date(&self, row: &RawRow, key: &str) -> ImportResult<NaiveDate> {
        let raw = self.require_string(row, key)?;
        parse_date_value(&raw).ok_or_else(|| ImportError::DateFormatError {
            row: row.row_number,
            field: key.to_string(),
            value: raw.clone(),
        })
    }
}

pub(crate) fn parse_date_value(raw: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];

    let value = raw.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt.date());
    }
    excel_serial_to_date(value)
}

/// Excel 序列号（1900 日期系统，基准 1899-12-30）
/// 序列号下限（1954-10-03），更小的数字多为年份或数量
const MIN_EXCEL_SERIAL: f64 = 20_000.0;

fn excel_serial_to_date(value: &str) -> Option<NaiveDate> {
    // 8 位纯数字已按 YYYYMMDD 处理
    let serial = value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && (MIN_EXCEL_SERIAL..100_000.0).contains(v))?;
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.floor() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(row_number: usize, pairs: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number,
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_map_transactions_basic() {
        let rows = vec![
            row(2, &[("date", "2024-01-01"), ("sku_id", "A"), ("warehouse_id", "W1"), ("quantity_sold", "5")]),
            row(3, &[("date", "2024/01/02"), ("sku_id", "A"), ("warehouse_id", "W1"), ("quantity_sold", "7.5")]),
        ];

        let records = TableMapper.map_transactions(&rows).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, day(2024, 1, 1));
        assert_eq!(records[1].date, day(2024, 1, 2));
        assert_eq!(records[1].quantity, 7.5);
        assert_eq!(records[0].location_id, "W1");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_date_value("20240315"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date_value("2024-03-15 08:30:00"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date_value("45366"), Some(day(2024, 3, 15)));
        assert_eq!(parse_date_value("45366.75"), Some(day(2024, 3, 15)));
        // 年份或小整数不当作序列号
        assert_eq!(parse_date_value("2024"), None);
        assert_eq!(parse_date_value("12"), None);
        assert_eq!(parse_date_value("15.03.2024"), None);
    }

    #[test]
    fn test_negative_quantity_is_row_error() {
        let rows = vec![row(
            4,
            &[("date", "2024-01-01"), ("sku_id", "A"), ("warehouse_id", "W1"), ("quantity_sold", "-3")],
        )];

        let err = TableMapper.map_transactions(&rows).unwrap_err();
        assert!(matches!(err, ImportError::NegativeValue { row: 4, .. }));
        assert_eq!(err.row(), Some(4));
    }

    #[test]
    fn test_missing_id_and_bad_number() {
        let rows = vec![row(2, &[("sku_id", ""), ("warehouse_id", "W1"), ("current_inventory", "10")])];
        let err = TableMapper.map_inventory(&rows).unwrap_err();
        assert!(matches!(err, ImportError::MissingValue { row: 2, ref field } if field == "sku_id"));

        let rows = vec![row(5, &[("sku_id", "A"), ("warehouse_id", "W1"), ("current_inventory", "ten")])];
        let err = TableMapper.map_inventory(&rows).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 5, .. }));
    }

    #[test]
    fn test_missing_column() {
        let rows = vec![row(2, &[("sku_id", "A"), ("warehouse_id", "W1")])];
        let err = TableMapper.map_inventory(&rows).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "current_inventory"));
    }

    #[test]
    fn test_aliases_accepted() {
        let rows = vec![row(2, &[("item_id", "A"), ("location_id", "W9"), ("inventory", "12")])];
        let snapshots = TableMapper.map_inventory(&rows).unwrap();
        assert_eq!(snapshots[0].location_id, "W9");
        assert_eq!(snapshots[0].current_inventory, 12.0);
    }
}
