// ==========================================
// 需求预测与自动调拨系统 - 库存与缺口领域模型
// ==========================================

use crate::domain::types::PairKey;
use serde::{Deserialize, Serialize};

// ==========================================
// InventorySnapshot - 当前库存快照
// ==========================================
// 与预测覆盖范围相互独立（任一侧都可能缺失该组合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub item_id: String,
    pub location_id: String,
    pub current_inventory: f64,
}

impl InventorySnapshot {
    pub fn new(item_id: impl Into<String>, location_id: impl Into<String>, current_inventory: f64) -> Self {
        Self {
            item_id: item_id.into(),
            location_id: location_id.into(),
            current_inventory,
        }
    }

    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.item_id.clone(), self.location_id.clone())
    }
}

// ==========================================
// GapRecord - 库存缺口
// ==========================================
// gap = round(current_inventory - 近期预测需求)
// gap < 0: 缺货; gap > 0: 富余
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapRecord {
    #[serde(rename = "sku_id")]
    pub item_id: String,
    #[serde(rename = "warehouse_id")]
    pub location_id: String,
    pub forecasted_demand: i64,
    pub current_inventory: f64,
    pub gap: i64,
}

impl GapRecord {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.item_id.clone(), self.location_id.clone())
    }

    pub fn is_shortage(&self) -> bool {
        self.gap < 0
    }
}
