// ==========================================
// 需求预测与自动调拨系统 - 调拨建议领域模型
// ==========================================
// 每次运行重新生成，不与历史结果合并
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// TransferSuggestion - 调拨建议
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSuggestion {
    #[serde(rename = "sku_id")]
    pub item_id: String,
    #[serde(rename = "from_warehouse")]
    pub from_location: String,
    #[serde(rename = "to_warehouse")]
    pub to_location: String,
    pub quantity: i64, // 正整数
}

// ==========================================
// UnmetShortage - 调拨后仍未满足的缺口
// ==========================================
// 同一商品全局富余不足时出现，属正常结果而非错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetShortage {
    pub item_id: String,
    pub location_id: String,
    pub original_need: i64,
    pub unmet_need: i64,
}

// ==========================================
// TransferPlan - 调拨方案
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferPlan {
    pub suggestions: Vec<TransferSuggestion>,
    pub unmet: Vec<UnmetShortage>,
}

impl TransferPlan {
    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn total_quantity(&self) -> i64 {
        self.suggestions.iter().map(|s| s.quantity).sum()
    }
}
