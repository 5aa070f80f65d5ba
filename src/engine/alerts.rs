// ==========================================
// 需求预测与自动调拨系统 - 预警与汇总
// ==========================================
// 职责: 基于缺口与调拨方案生成展示数据
// - 低库存预警（gap < 0）
// - 调拨表状态
// - 按商品汇总调拨量 / 按商品筛选
// - 单组合预测查看
// ==========================================

use crate::domain::forecast::ForecastPoint;
use crate::domain::inventory::GapRecord;
use crate::domain::transfer::{TransferPlan, TransferSuggestion};
use crate::domain::types::{PairKey, TransferStatus};
use crate::i18n::{t, t_with_args};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// LowStockAlert - 低库存预警
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub item_id: String,
    pub location_id: String,
    pub short_by: i64,
    pub forecasted_demand: i64,
    pub current_inventory: f64,
}

impl LowStockAlert {
    /// 本地化预警文案（库存取整数部分展示）
    pub fn message(&self) -> String {
        t_with_args(
            "alert.low_stock",
            &[
                ("sku", &self.item_id),
                ("warehouse", &self.location_id),
                ("short_by", &self.short_by.to_string()),
                ("demand", &self.forecasted_demand.to_string()),
                ("inventory", &(self.current_inventory.trunc() as i64).to_string()),
            ],
        )
    }
}

/// 按商品汇总的调拨量
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTransferTotal {
    pub item_id: String,
    pub quantity: i64,
}

/// 低库存预警: 缺口表中 gap < 0 的全部组合（保持输入顺序）
pub fn low_stock_alerts(gaps: &[GapRecord]) -> Vec<LowStockAlert> {
    gaps.iter()
        .filter(|g| g.is_shortage())
        .map(|g| LowStockAlert {
            item_id: g.item_id.clone(),
            location_id: g.location_id.clone(),
            short_by: g.gap.abs(),
            forecasted_demand: g.forecasted_demand,
            current_inventory: g.current_inventory,
        })
        .collect()
}

/// 调拨表状态
pub fn transfer_status(alerts: &[LowStockAlert], plan: &TransferPlan) -> TransferStatus {
    if !plan.is_empty() {
        TransferStatus::TransfersPlanned
    } else if alerts.is_empty() {
        TransferStatus::NoShortage
    } else {
        TransferStatus::ShortageWithoutTransfers
    }
}

/// 调拨表状态文案
pub fn status_message(status: TransferStatus, plan: &TransferPlan) -> String {
    match status {
        TransferStatus::NoShortage => t("transfer.no_shortage"),
        TransferStatus::ShortageWithoutTransfers => t("transfer.shortage_without_transfers"),
        TransferStatus::TransfersPlanned => t_with_args(
            "transfer.planned",
            &[
                ("count", &plan.suggestions.len().to_string()),
                ("quantity", &plan.total_quantity().to_string()),
            ],
        ),
    }
}

/// 按商品筛选调拨建议（None 表示全部）
pub fn filter_by_item(suggestions: &[TransferSuggestion], item_id: Option<&str>) -> Vec<TransferSuggestion> {
    suggestions
        .iter()
        .filter(|s| item_id.map_or(true, |item| s.item_id == item))
        .cloned()
        .collect()
}

/// 调拨方案中出现的商品（排序去重，用于筛选项）
pub fn items_in_plan(suggestions: &[TransferSuggestion]) -> Vec<String> {
    let mut items: Vec<String> = suggestions.iter().map(|s| s.item_id.clone()).collect();
    items.sort();
    items.dedup();
    items
}

/// 按商品汇总调拨量，按数量降序（相同数量按商品编码升序）
pub fn transfers_by_item(suggestions: &[TransferSuggestion]) -> Vec<ItemTransferTotal> {
    let mut totals: BTreeMap<&str, i64> = BTreeMap::new();
    for s in suggestions {
        *totals.entry(s.item_id.as_str()).or_insert(0) += s.quantity;
    }

    let mut out: Vec<ItemTransferTotal> = totals
        .into_iter()
        .map(|(item_id, quantity)| ItemTransferTotal {
            item_id: item_id.to_string(),
            quantity,
        })
        .collect();
    out.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.item_id.cmp(&b.item_id)));
    out
}

/// 单组合预测数据（按日期排序）
pub fn forecast_for_pair(points: &[ForecastPoint], pair: &PairKey) -> Vec<ForecastPoint> {
    let mut rows: Vec<ForecastPoint> = points.iter().filter(|p| p.belongs_to(pair)).cloned().collect();
    rows.sort_by_key(|p| p.day);
    rows
}
