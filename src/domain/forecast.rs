// ==========================================
// 需求预测与自动调拨系统 - 预测结果领域模型
// ==========================================

use crate::domain::types::PairKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ForecastPoint - 单日预测点
// ==========================================
// 覆盖: 历史区间 + 预测期
// 注意: lower ≤ yhat ≤ upper 不做强制，低销量时 yhat 可能为负
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub item_id: String,
    pub location_id: String,
    pub day: NaiveDate,
    pub predicted_quantity: f64, // yhat
    pub lower_bound: f64,        // yhat_lower
    pub upper_bound: f64,        // yhat_upper
    pub is_future: bool,         // true = 预测期（历史最后一天之后）
}

impl ForecastPoint {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(self.item_id.clone(), self.location_id.clone())
    }

    pub fn belongs_to(&self, pair: &PairKey) -> bool {
        self.item_id == pair.item_id && self.location_id == pair.location_id
    }
}

/// 导出格式（列名与外部表一致：ds,yhat,yhat_lower,yhat_upper,sku_id,warehouse_id）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastExportRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub sku_id: String,
    pub warehouse_id: String,
}

impl From<&ForecastPoint> for ForecastExportRow {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            ds: p.day,
            yhat: p.predicted_quantity,
            yhat_lower: p.lower_bound,
            yhat_upper: p.upper_bound,
            sku_id: p.item_id.clone(),
            warehouse_id: p.location_id.clone(),
        }
    }
}
