// ==========================================
// 需求预测与自动调拨系统 - CSV 导出器
// ==========================================
// 预测表: ds,yhat,yhat_lower,yhat_upper,sku_id,warehouse_id
// 缺口表: sku_id,warehouse_id,forecasted_demand,current_inventory,gap
// 调拨表: sku_id,from_warehouse,to_warehouse,quantity
// 空表也写出表头
// ==========================================

use crate::domain::forecast::{ForecastExportRow, ForecastPoint};
use crate::domain::inventory::GapRecord;
use crate::domain::transfer::TransferSuggestion;
use crate::engine::alerts::filter_by_item;
use crate::export::error::ExportResult;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const FULL_FORECAST_FILE: &str = "full_forecast.csv";
pub const GAP_TABLE_FILE: &str = "inventory_gap.csv";
pub const TRANSFER_PLAN_FILE: &str = "transfer_plan.csv";
pub const FILTERED_TRANSFER_PLAN_FILE: &str = "filtered_transfer_plan.csv";

const FORECAST_HEADER: [&str; 6] = ["ds", "yhat", "yhat_lower", "yhat_upper", "sku_id", "warehouse_id"];
const GAP_HEADER: [&str; 5] = ["sku_id", "warehouse_id", "forecasted_demand", "current_inventory", "gap"];
const TRANSFER_HEADER: [&str; 4] = ["sku_id", "from_warehouse", "to_warehouse", "quantity"];

pub struct CsvExporter;

impl CsvExporter {
    // ===== Writer 接口 =====

    pub fn write_forecast<W: Write>(&self, writer: W, points: &[ForecastPoint]) -> ExportResult<()> {
        let rows = points.iter().map(ForecastExportRow::from);
        write_table(writer, &FORECAST_HEADER, rows)
    }

    pub fn write_gaps<W: Write>(&self, writer: W, gaps: &[GapRecord]) -> ExportResult<()> {
        write_table(writer, &GAP_HEADER, gaps.iter())
    }

    pub fn write_transfer_plan<W: Write>(
        &self,
        writer: W,
        suggestions: &[TransferSuggestion],
    ) -> ExportResult<()> {
        write_table(writer, &TRANSFER_HEADER, suggestions.iter())
    }

    /// 按商品过滤后写出（None = 全部）
    pub fn write_filtered_transfer_plan<W: Write>(
        &self,
        writer: W,
        suggestions: &[TransferSuggestion],
        item_id: Option<&str>,
    ) -> ExportResult<()> {
        let filtered = filter_by_item(suggestions, item_id);
        self.write_transfer_plan(writer, &filtered)
    }

    // ===== 文件接口 =====

    pub fn export_forecast_file<P: AsRef<Path>>(&self, path: P, points: &[ForecastPoint]) -> ExportResult<()> {
        let path = path.as_ref();
        self.write_forecast(create_file(path)?, points)?;
        info!(path = %path.display(), rows = points.len(), "预测表已导出");
        Ok(())
    }

    pub fn export_gap_file<P: AsRef<Path>>(&self, path: P, gaps: &[GapRecord]) -> ExportResult<()> {
        let path = path.as_ref();
        self.write_gaps(create_file(path)?, gaps)?;
        info!(path = %path.display(), rows = gaps.len(), "缺口表已导出");
        Ok(())
    }

    pub fn export_transfer_plan_file<P: AsRef<Path>>(
        &self,
        path: P,
        suggestions: &[TransferSuggestion],
        item_id: Option<&str>,
    ) -> ExportResult<()> {
        let path = path.as_ref();
        self.write_filtered_transfer_plan(create_file(path)?, suggestions, item_id)?;
        info!(path = %path.display(), item = item_id.unwrap_or("*"), "调拨表已导出");
        Ok(())
    }
}

fn create_file(path: &Path) -> ExportResult<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn write_table<W, I, T>(writer: W, header: &[&str], rows: I) -> ExportResult<()>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(header)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn suggestion(item: &str, from: &str, to: &str, quantity: i64) -> TransferSuggestion {
        TransferSuggestion {
            item_id: item.to_string(),
            from_location: from.to_string(),
            to_location: to.to_string(),
            quantity,
        }
    }

    fn to_string(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_forecast_columns() {
        let point = ForecastPoint {
            item_id: "A".to_string(),
            location_id: "W1".to_string(),
            day: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            predicted_quantity: 5.5,
            lower_bound: 4.0,
            upper_bound: 7.0,
            is_future: true,
        };

        let mut buf = Vec::new();
        CsvExporter.write_forecast(&mut buf, &[point]).unwrap();
        let text = to_string(buf);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ds,yhat,yhat_lower,yhat_upper,sku_id,warehouse_id"));
        assert_eq!(lines.next(), Some("2024-01-08,5.5,4.0,7.0,A,W1"));
    }

    #[test]
    fn test_empty_plan_writes_header() {
        let mut buf = Vec::new();
        CsvExporter.write_transfer_plan(&mut buf, &[]).unwrap();
        assert_eq!(to_string(buf), "sku_id,from_warehouse,to_warehouse,quantity\n");
    }

    #[test]
    fn test_filtered_plan() {
        let plan = vec![suggestion("A", "W3", "W1", 15), suggestion("B", "W1", "W2", 4)];

        let mut buf = Vec::new();
        CsvExporter
            .write_filtered_transfer_plan(&mut buf, &plan, Some("B"))
            .unwrap();
        let text = to_string(buf);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("B,W1,W2,4"));
        assert!(!text.contains("A,W3"));
    }

    #[test]
    fn test_gap_columns() {
        let gap = GapRecord {
            item_id: "A".to_string(),
            location_id: "W1".to_string(),
            forecasted_demand: 35,
            current_inventory: 20.0,
            gap: -15,
        };
        let mut buf = Vec::new();
        CsvExporter.write_gaps(&mut buf, &[gap]).unwrap();
        let text = to_string(buf);
        assert!(text.starts_with("sku_id,warehouse_id,forecasted_demand,current_inventory,gap\n"));
        assert!(text.contains("A,W1,35,20.0,-15"));
    }

    #[test]
    fn test_export_file_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(TRANSFER_PLAN_FILE);
        CsvExporter
            .export_transfer_plan_file(&path, &[suggestion("A", "W3", "W1", 15)], None)
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("A,W3,W1,15"));
    }

    #[test]
    fn test_gap_file_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaps").join("gap_table.csv");
        let gaps = vec![
            GapRecord {
                item_id: "A".to_string(),
                location_id: "W1".to_string(),
                forecasted_demand: 35,
                current_inventory: 20.0,
                gap: -15,
            },
            GapRecord {
                item_id: "A".to_string(),
                location_id: "W2".to_string(),
                forecasted_demand: 35,
                current_inventory: 80.5,
                gap: 46,
            },
        ];

        CsvExporter.export_gap_file(&path, &gaps).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            text,
            "sku_id,warehouse_id,forecasted_demand,current_inventory,gap\nA,W1,35,20.0,-15\nA,W2,35,80.5,46\n"
        );
    }
}
